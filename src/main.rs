use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use linkquill::config::Config;
use linkquill::document::codec::{decode_json, decode_yaml, encode_json, to_value};
use linkquill::document::node::{Link, Node};
use linkquill::selector::{parse_selector, Selector};
use linkquill::store::DirectoryStore;
use linkquill::traversal::Progress;

/// LinkQuill - declarative selectors over content-addressed linked data
#[derive(Parser)]
#[command(name = "linkquill")]
#[command(version)]
#[command(about = "Apply selectors to linked data and manage block stores", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Walk a document with a selector and print every node it matches
    Select {
        /// Selector file (JSON, or YAML by .yaml/.yml extension)
        #[arg(short, long)]
        selector: PathBuf,

        /// Root document to walk
        #[arg(short, long, conflicts_with = "link", required_unless_present = "link")]
        file: Option<PathBuf>,

        /// Address of a stored block to start from
        #[arg(short, long)]
        link: Option<String>,

        /// Block store directory used to resolve links (overrides the config)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Output format: "path-value" or "json" (overrides the config)
        #[arg(long)]
        format: Option<String>,

        /// Load a link again every time it is reached
        #[arg(long)]
        no_cache: bool,
    },

    /// Store a JSON document as a block and print its link
    Put {
        /// Document to store
        file: PathBuf,

        /// Block store directory
        #[arg(long)]
        store: PathBuf,

        /// Write the block gzip-compressed
        #[arg(long)]
        compress: bool,
    },

    /// Validate a selector file and print its canonical form
    Check {
        /// Selector file (JSON, or YAML by .yaml/.yml extension)
        file: PathBuf,
    },
}

/// Installs the stderr log subscriber; `RUST_LOG` wins over the config.
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Reads a file, decompressing it first when it ends in `.gz`.
fn read_file_bytes(path: &Path) -> Result<Vec<u8>> {
    let is_gzipped = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    if is_gzipped {
        use flate2::read::GzDecoder;

        let file = fs::File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let mut bytes = Vec::new();
        GzDecoder::new(file)
            .read_to_end(&mut bytes)
            .context("Failed to decompress gzipped file - file may be corrupted")?;
        Ok(bytes)
    } else {
        fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

fn load_document(path: &Path) -> Result<Node> {
    let bytes = read_file_bytes(path)?;
    let node = if is_yaml(path) {
        let text = String::from_utf8(bytes).context("YAML file is not valid UTF-8")?;
        decode_yaml(&text)
    } else {
        decode_json(&bytes)
    };
    node.with_context(|| format!("Failed to parse {}", path.display()))
}

fn load_selector(path: &Path) -> Result<Selector> {
    let spec = load_document(path)?;
    parse_selector(&spec).with_context(|| format!("Invalid selector in {}", path.display()))
}

fn json_line(node: &Node) -> Result<String> {
    Ok(serde_json::to_string(&to_value(node)?)?)
}

fn run_select(
    mut config: Config,
    selector: &Path,
    file: Option<&Path>,
    link: Option<&str>,
    store: Option<PathBuf>,
    format: Option<String>,
    no_cache: bool,
) -> Result<()> {
    if store.is_some() {
        config.store_dir = store;
    }
    if let Some(format) = format {
        config.output_format = format;
    }
    if no_cache {
        config.cache_links = false;
    }

    let selector = load_selector(selector)?;
    let root = match (file, link) {
        (Some(path), _) => load_document(path)?,
        (None, Some(address)) => {
            if config.store_dir.is_none() {
                bail!("--link needs a block store (--store or store_dir in the config)");
            }
            Node::Link(Link::new(address))
        }
        (None, None) => bail!("either --file or --link is required"),
    };

    let traversal = config
        .traversal_config()
        .context("Failed to open block store")?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match config.output_format.as_str() {
        "path-value" => {
            Progress::new(&traversal).traverse(&root, &selector, |progress, node| {
                writeln!(out, "{}\t{}", progress.path, json_line(node)?)?;
                Ok::<(), anyhow::Error>(())
            })?;
        }
        "json" => {
            let visits = Progress::new(&traversal).collect(&root, &selector)?;
            let mut entries = Vec::with_capacity(visits.len());
            for (path, node) in &visits {
                entries.push(serde_json::json!({
                    "path": path.to_string(),
                    "node": to_value(node)?,
                }));
            }
            serde_json::to_writer_pretty(&mut out, &entries)?;
            writeln!(out)?;
        }
        other => bail!("unknown output format {:?}", other),
    }

    out.flush()?;
    Ok(())
}

fn run_put(file: &Path, store: &Path, compress: bool) -> Result<()> {
    let node = load_document(file)?;
    let store = DirectoryStore::new(store)
        .context("Failed to open block store")?
        .with_compression(compress);
    let link = store.put(&encode_json(&node)?)?;
    println!("{}", link);
    Ok(())
}

fn run_check(file: &Path) -> Result<()> {
    let selector = load_selector(file)?;
    println!("{}", json_line(selector.to_spec().node())?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load();
    init_logging(&config);

    match cli.command {
        Command::Select {
            selector,
            file,
            link,
            store,
            format,
            no_cache,
        } => run_select(
            config,
            &selector,
            file.as_deref(),
            link.as_deref(),
            store,
            format,
            no_cache,
        ),
        Command::Put {
            file,
            store,
            compress,
        } => run_put(&file, &store, compress),
        Command::Check { file } => run_check(&file),
    }
}
