//! Traversal configuration and progress.

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use super::error::{BoxError, TraversalError};
use super::loader::{FnLoader, LinkContext, LinkLoader};
use super::walk::{Resolver, Walker};
use crate::document::codec::{DagJson, NodeDecoder};
use crate::document::node::{Link, Node};
use crate::document::path::{Path, PathSegment};
use crate::selector::Selector;

/// How a traversal resolves links.
///
/// The default configuration has no loader, decodes blocks as DAG-JSON and
/// caches each resolved link for the rest of the traversal.
#[derive(Clone)]
pub struct TraversalConfig {
    loader: Option<Arc<dyn LinkLoader>>,
    decoder: Arc<dyn NodeDecoder>,
    cache_links: bool,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            loader: None,
            decoder: Arc::new(DagJson),
            cache_links: true,
        }
    }
}

impl fmt::Debug for TraversalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraversalConfig")
            .field("has_loader", &self.loader.is_some())
            .field("cache_links", &self.cache_links)
            .finish()
    }
}

impl TraversalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_loader(mut self, loader: impl LinkLoader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    pub fn with_shared_loader(mut self, loader: Arc<dyn LinkLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Uses a closure as the link loader.
    ///
    /// ```
    /// use std::io::Cursor;
    /// use linkquill::traversal::TraversalConfig;
    ///
    /// let config = TraversalConfig::new().with_loader_fn(|_link, _ctx| {
    ///     Ok(Box::new(Cursor::new(b"\"alpha\"".to_vec())))
    /// });
    /// assert!(config.loader().is_some());
    /// ```
    pub fn with_loader_fn<F>(self, loader: F) -> Self
    where
        F: Fn(&Link, &LinkContext<'_>) -> Result<Box<dyn Read>, BoxError> + Send + Sync + 'static,
    {
        self.with_loader(FnLoader(loader))
    }

    pub fn with_decoder(mut self, decoder: impl NodeDecoder + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    /// Turns the per-traversal link cache on or off. With the cache off,
    /// a link reached twice is loaded twice.
    pub fn with_cache_links(mut self, cache_links: bool) -> Self {
        self.cache_links = cache_links;
        self
    }

    pub fn loader(&self) -> Option<&Arc<dyn LinkLoader>> {
        self.loader.as_ref()
    }

    pub fn decoder(&self) -> &dyn NodeDecoder {
        self.decoder.as_ref()
    }

    pub fn cache_links(&self) -> bool {
        self.cache_links
    }
}

/// The block a traversal most recently crossed into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastBlock {
    /// Path of the link that was resolved.
    pub path: Path,
    /// The link itself.
    pub link: Link,
}

/// Where a traversal is: the path from the root, the last block loaded and
/// the configuration in force.
#[derive(Debug, Clone)]
pub struct Progress<'c> {
    pub path: Path,
    pub last_block: Option<LastBlock>,
    config: &'c TraversalConfig,
}

impl<'c> Progress<'c> {
    /// Progress at the root of a new traversal.
    pub fn new(config: &'c TraversalConfig) -> Self {
        Self {
            path: Path::root(),
            last_block: None,
            config,
        }
    }

    pub fn config(&self) -> &'c TraversalConfig {
        self.config
    }

    /// Progress one step further down.
    pub fn descend(&self, segment: PathSegment) -> Progress<'c> {
        Progress {
            path: self.path.join(segment),
            last_block: self.last_block.clone(),
            config: self.config,
        }
    }

    /// Progress after crossing `link` at the current path.
    pub fn enter_block(&self, link: &Link) -> Progress<'c> {
        Progress {
            path: self.path.clone(),
            last_block: Some(LastBlock {
                path: self.path.clone(),
                link: link.clone(),
            }),
            config: self.config,
        }
    }

    /// Walks `root` with `selector`, calling `visit` on every node the
    /// selector matches.
    ///
    /// Visits happen depth-first in pre-order. Children are taken in the
    /// order the selector declares them, or in map insertion order and
    /// ascending list index when the selector wants all children. An error
    /// from `visit` or from link resolution stops the walk and is returned.
    pub fn traverse<F, E>(&self, root: &Node, selector: &Selector, visit: F) -> Result<(), E>
    where
        F: FnMut(&Progress<'c>, &Node) -> Result<(), E>,
        E: From<TraversalError>,
    {
        Walker::new(self.config, visit).walk(self, root, selector)
    }

    /// Walks `root` and gathers every visit in order.
    pub fn collect(
        &self,
        root: &Node,
        selector: &Selector,
    ) -> Result<Vec<(Path, Node)>, TraversalError> {
        let mut visits = Vec::new();
        self.traverse(root, selector, |progress, node| {
            visits.push((progress.path.clone(), node.clone()));
            Ok::<(), TraversalError>(())
        })?;
        Ok(visits)
    }

    /// Follows a literal path from `root`, resolving links on the way, and
    /// returns the node at its end.
    pub fn focus(&self, root: &Node, path: &Path) -> Result<Node, TraversalError> {
        Resolver::new(self.config).focus(self, root, &path.segments())
    }
}
