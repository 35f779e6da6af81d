//! Block store backed by a directory, one file per block.
//!
//! A block with address `b3-…` lives in `<dir>/b3-….json`, or in
//! `<dir>/b3-….json.gz` when it was written compressed.

use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::debug;

use super::StoreError;
use crate::document::codec::encode_json;
use crate::document::node::{Link, Node};
use crate::traversal::{BoxError, LinkContext, LinkLoader};

/// A block store rooted at a directory.
///
/// # Example
///
/// ```no_run
/// use linkquill::document::node::Node;
/// use linkquill::store::DirectoryStore;
///
/// let store = DirectoryStore::new("blocks").unwrap();
/// let link = store.put_node(&Node::from("alpha")).unwrap();
/// println!("{}", link);
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    compress: bool,
}

impl DirectoryStore {
    /// Opens a store at `root`, creating the directory if needed.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            compress: false,
        })
    }

    /// Writes new blocks gzip-compressed.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a link to a file directly under the root.
    ///
    /// Only addresses made of ASCII alphanumerics, `-` and `_` are accepted;
    /// an address read from block data must never name a file outside the root.
    fn block_path(&self, link: &Link, suffix: &str) -> Result<PathBuf, StoreError> {
        let address = link.as_str();
        let plain = !address.is_empty()
            && address
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if !plain {
            return Err(StoreError::InvalidAddress(link.clone()));
        }
        Ok(self.root.join(format!("{}{}", address, suffix)))
    }

    fn plain_path(&self, link: &Link) -> Result<PathBuf, StoreError> {
        self.block_path(link, ".json")
    }

    fn gzip_path(&self, link: &Link) -> Result<PathBuf, StoreError> {
        self.block_path(link, ".json.gz")
    }

    /// Stores raw block bytes and returns their link.
    ///
    /// Putting a block that is already present leaves the file untouched.
    pub fn put(&self, bytes: &[u8]) -> Result<Link, StoreError> {
        let link = Link::for_bytes(bytes);
        if self.contains(&link) {
            debug!(%link, "block already stored");
            return Ok(link);
        }
        let path = if self.compress {
            self.gzip_path(&link)?
        } else {
            self.plain_path(&link)?
        };
        write_file_atomic(&path, bytes, self.compress)?;
        debug!(%link, path = %path.display(), "stored block");
        Ok(link)
    }

    /// Encodes a node as a block and stores it.
    pub fn put_node(&self, node: &Node) -> Result<Link, StoreError> {
        self.put(&encode_json(node)?)
    }

    /// Reads a block's bytes, decompressing if it was stored gzipped.
    pub fn get(&self, link: &Link) -> Result<Vec<u8>, StoreError> {
        let gzip_path = self.gzip_path(link)?;
        if gzip_path.exists() {
            let file = fs::File::open(&gzip_path)?;
            let mut decoder = GzDecoder::new(file);
            let mut bytes = Vec::new();
            decoder.read_to_end(&mut bytes)?;
            return Ok(bytes);
        }
        match fs::read(self.plain_path(link)?) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(link.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Reports whether a block is stored. Invalid addresses are never stored.
    pub fn contains(&self, link: &Link) -> bool {
        let exists = |path: Result<PathBuf, StoreError>| {
            path.map(|path| path.exists()).unwrap_or(false)
        };
        exists(self.plain_path(link)) || exists(self.gzip_path(link))
    }
}

impl LinkLoader for DirectoryStore {
    fn load(&self, link: &Link, _ctx: &LinkContext<'_>) -> Result<Box<dyn Read>, BoxError> {
        Ok(Box::new(Cursor::new(self.get(link)?)))
    }
}

/// Writes through a sibling temp file and renames it into place.
fn write_file_atomic(path: &Path, data: &[u8], compress: bool) -> Result<(), StoreError> {
    let temp_path = path.with_extension("tmp");

    if compress {
        let file = fs::File::create(&temp_path)?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(data)?;
        encoder.finish()?;
    } else {
        fs::write(&temp_path, data)?;
    }

    fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_put_writes_named_file() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryStore::new(dir.path()).unwrap();
        let link = store.put(b"true").unwrap();
        let expected = dir.path().join(format!("{}.json", link));
        assert_eq!(fs::read(expected).unwrap(), b"true".to_vec());
        assert!(!dir.path().join(format!("{}.tmp", link)).exists());
    }

    #[test]
    fn test_compressed_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryStore::new(dir.path())
            .unwrap()
            .with_compression(true);
        let link = store.put(b"[1,2,3]").unwrap();
        assert!(dir.path().join(format!("{}.json.gz", link)).exists());
        assert_eq!(store.get(&link).unwrap(), b"[1,2,3]".to_vec());
    }

    #[test]
    fn test_missing_block() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryStore::new(dir.path()).unwrap();
        match store.get(&Link::new("b3-absent")) {
            Err(StoreError::NotFound(link)) => assert_eq!(link.as_str(), "b3-absent"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_rejects_addresses_that_leave_the_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("blocks");
        let store = DirectoryStore::new(&root).unwrap();
        fs::write(dir.path().join("outside.json"), b"\"hidden\"").unwrap();

        for address in ["../outside", "", ".", "..", "a/b", "a\\b", "b3-x.json"] {
            let link = Link::new(address);
            assert!(
                matches!(store.get(&link), Err(StoreError::InvalidAddress(_))),
                "address {:?} was accepted",
                address
            );
            assert!(!store.contains(&link));
        }
    }
}
