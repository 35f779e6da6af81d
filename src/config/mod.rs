//! Configuration system for linkquill.
//!
//! Settings live in `~/.config/linkquill/config.toml`. Every field has a
//! default, so a partial file (or none at all) is fine.
//!
//! # Example
//!
//! ```
//! use linkquill::config::Config;
//!
//! let config = Config::default();
//! assert!(config.cache_links);
//! assert_eq!(config.log_filter, "warn");
//!
//! let custom = Config {
//!     output_format: "json".to_string(),
//!     ..Config::default()
//! };
//! assert_eq!(custom.output_format, "json");
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::store::{DirectoryStore, StoreError};
use crate::traversal::TraversalConfig;

/// Configuration for the linkquill tool.
///
/// * `store_dir` - Directory block store used to resolve links (default: none)
/// * `cache_links` - Cache resolved links for the rest of a traversal (default: true)
/// * `log_filter` - `tracing` filter used when `RUST_LOG` is unset (default: "warn")
/// * `output_format` - "path-value" or "json" (default: "path-value")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory block store used to resolve links
    #[serde(default)]
    pub store_dir: Option<PathBuf>,

    /// Cache resolved links for the rest of a traversal
    #[serde(default = "default_cache_links")]
    pub cache_links: bool,

    /// Log filter directive
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// How `select` prints its visits
    #[serde(default = "default_output_format")]
    pub output_format: String,
}

fn default_cache_links() -> bool {
    true
}

fn default_log_filter() -> String {
    "warn".to_string()
}

fn default_output_format() -> String {
    "path-value".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: None,
            cache_links: default_cache_links(),
            log_filter: default_log_filter(),
            output_format: default_output_format(),
        }
    }
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/linkquill/config.toml` on all platforms.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("linkquill");
            path.push("config.toml");
            path
        })
    }

    /// Loads configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist or can't be read.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Loads configuration from `path`, falling back to defaults.
    pub fn load_from(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|_| Self::default()),
            Err(_) => Self::default(),
        }
    }

    /// Saves configuration to the default config file.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        self.save_to(&config_path)
    }

    /// Saves configuration to `path` as pretty TOML.
    pub fn save_to(&self, path: &std::path::Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Builds the traversal configuration these settings describe.
    ///
    /// When `store_dir` is set, links resolve through a [`DirectoryStore`]
    /// rooted there.
    pub fn traversal_config(&self) -> Result<TraversalConfig, StoreError> {
        let config = TraversalConfig::new().with_cache_links(self.cache_links);
        match &self.store_dir {
            Some(dir) => Ok(config.with_loader(DirectoryStore::new(dir)?)),
            None => Ok(config),
        }
    }
}
