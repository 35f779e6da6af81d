//! Link loading.
//!
//! The traversal engine never knows where blocks live. When it reaches a
//! link it asks the configured `LinkLoader` for a byte stream and hands that
//! stream to the configured decoder.

use std::fmt;
use std::io::Read;

use super::error::BoxError;
use super::progress::LastBlock;
use crate::document::node::Link;
use crate::document::path::Path;

/// Where in the traversal a link is being loaded.
#[derive(Debug, Clone, Copy)]
pub struct LinkContext<'a> {
    /// Path of the link node from the traversal root.
    pub path: &'a Path,
    /// The most recently loaded block that contains this link, if any.
    pub last_block: Option<&'a LastBlock>,
}

/// Fetches the bytes behind a link.
///
/// Loaders may be shared across traversals, so they must tolerate
/// concurrent calls.
pub trait LinkLoader: Send + Sync {
    fn load(&self, link: &Link, ctx: &LinkContext<'_>) -> Result<Box<dyn Read>, BoxError>;
}

/// Adapts a closure into a `LinkLoader`.
pub struct FnLoader<F>(pub F);

impl<F> LinkLoader for FnLoader<F>
where
    F: Fn(&Link, &LinkContext<'_>) -> Result<Box<dyn Read>, BoxError> + Send + Sync,
{
    fn load(&self, link: &Link, ctx: &LinkContext<'_>) -> Result<Box<dyn Read>, BoxError> {
        (self.0)(link, ctx)
    }
}

impl<F> fmt::Debug for FnLoader<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnLoader")
    }
}
