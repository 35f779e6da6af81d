//! Block stores that double as link loaders.
//!
//! Blocks are addressed by the BLAKE3 digest of their encoded bytes, so
//! putting the same block twice yields the same link.

pub mod directory;
pub mod memory;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;

use thiserror::Error;

use crate::document::codec::CodecError;
use crate::document::node::Link;

/// Errors raised by block stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("block {0} not found")]
    NotFound(Link),
    #[error("block address {0} is not a plain file name")]
    InvalidAddress(Link),
    #[error("block store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode block: {0}")]
    Codec(#[from] CodecError),
}
