//! Errors that abort a traversal.

use thiserror::Error;

use crate::document::codec::CodecError;
use crate::document::node::Link;
use crate::document::path::{Path, PathSegment};

/// Boxed error returned by link loaders.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while walking a graph.
///
/// Structural mismatches between a selector and the data are not errors;
/// they prune the branch. Only link resolution and literal path lookups
/// fail.
#[derive(Debug, Error)]
pub enum TraversalError {
    /// A link was reached but the configuration has no loader.
    #[error("reached link {link} at \"{path}\" but no link loader is configured")]
    NoLoader { link: Link, path: Path },
    /// The loader could not produce the block.
    #[error("failed to load link {link} at \"{path}\"")]
    Load {
        link: Link,
        path: Path,
        #[source]
        source: BoxError,
    },
    /// The loaded block could not be decoded into a node.
    #[error("failed to decode block {link} at \"{path}\"")]
    Decode {
        link: Link,
        path: Path,
        #[source]
        source: CodecError,
    },
    /// A chain of links at one path led back to a link already entered there,
    /// or ran past the hop limit.
    #[error("link {link} at \"{path}\" resolves back into a link cycle")]
    LinkCycle { link: Link, path: Path },
    /// A literal path named a child that does not exist.
    #[error("no node at \"{path}\": {segment} not found")]
    PathNotFound { path: Path, segment: PathSegment },
}
