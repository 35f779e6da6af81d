//! The traversal executor.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use super::error::TraversalError;
use super::loader::LinkContext;
use super::progress::{Progress, TraversalConfig};
use crate::document::node::{Link, Node};
use crate::document::path::PathSegment;
use crate::selector::{Interests, Selector};

/// Most links followed at a single path before giving up.
const MAX_LINK_HOPS: usize = 64;

/// Turns links into nodes for the lifetime of one traversal.
pub(crate) struct Resolver<'c> {
    config: &'c TraversalConfig,
    cache: HashMap<Link, Arc<Node>>,
}

impl<'c> Resolver<'c> {
    pub(crate) fn new(config: &'c TraversalConfig) -> Self {
        Self {
            config,
            cache: HashMap::new(),
        }
    }

    fn resolve(&mut self, progress: &Progress<'c>, link: &Link) -> Result<Arc<Node>, TraversalError> {
        if let Some(node) = self.cache.get(link) {
            debug!(%link, path = %progress.path, "link cache hit");
            return Ok(Arc::clone(node));
        }

        let loader = self
            .config
            .loader()
            .ok_or_else(|| TraversalError::NoLoader {
                link: link.clone(),
                path: progress.path.clone(),
            })?;

        debug!(%link, path = %progress.path, "loading link");
        let ctx = LinkContext {
            path: &progress.path,
            last_block: progress.last_block.as_ref(),
        };
        let mut reader = loader
            .load(link, &ctx)
            .map_err(|source| TraversalError::Load {
                link: link.clone(),
                path: progress.path.clone(),
                source,
            })?;
        let node = self
            .config
            .decoder()
            .decode(reader.as_mut())
            .map_err(|source| TraversalError::Decode {
                link: link.clone(),
                path: progress.path.clone(),
                source,
            })?;

        let node = Arc::new(node);
        if self.config.cache_links() {
            self.cache.insert(link.clone(), Arc::clone(&node));
        }
        Ok(node)
    }

    /// Follows `link` and any bare links it resolves to, stopping at the first
    /// node that is not a link.
    ///
    /// Returns the progress after the last block entered along with that node.
    fn resolve_chain(
        &mut self,
        progress: &Progress<'c>,
        link: &Link,
    ) -> Result<(Progress<'c>, Arc<Node>), TraversalError> {
        let mut entered: Vec<Link> = Vec::new();
        let mut progress = progress.clone();
        let mut link = link.clone();
        loop {
            if entered.contains(&link) || entered.len() >= MAX_LINK_HOPS {
                return Err(TraversalError::LinkCycle {
                    link,
                    path: progress.path,
                });
            }
            let resolved = self.resolve(&progress, &link)?;
            progress = progress.enter_block(&link);
            entered.push(link);
            match resolved.as_ref() {
                Node::Link(next) => {
                    trace!(link = %next, path = %progress.path, "block is a bare link");
                    link = next.clone();
                }
                _ => return Ok((progress, resolved)),
            }
        }
    }

    pub(crate) fn focus(
        &mut self,
        progress: &Progress<'c>,
        node: &Node,
        remaining: &[PathSegment],
    ) -> Result<Node, TraversalError> {
        if let Node::Link(link) = node {
            let (entered, resolved) = self.resolve_chain(progress, link)?;
            return self.focus(&entered, &resolved, remaining);
        }
        let Some((segment, rest)) = remaining.split_first() else {
            return Ok(node.clone());
        };
        let child = node
            .lookup_segment(segment)
            .map_err(|_| TraversalError::PathNotFound {
                path: progress.path.clone(),
                segment: segment.clone(),
            })?;
        self.focus(&progress.descend(segment.clone()), child, rest)
    }
}

/// Drives a selector over a graph and reports matches to a visitor.
pub(crate) struct Walker<'c, F> {
    resolver: Resolver<'c>,
    visit: F,
}

impl<'c, F, E> Walker<'c, F>
where
    F: FnMut(&Progress<'c>, &Node) -> Result<(), E>,
    E: From<TraversalError>,
{
    pub(crate) fn new(config: &'c TraversalConfig, visit: F) -> Self {
        Self {
            resolver: Resolver::new(config),
            visit,
        }
    }

    pub(crate) fn walk(
        &mut self,
        progress: &Progress<'c>,
        node: &Node,
        selector: &Selector,
    ) -> Result<(), E> {
        if let Node::Link(link) = node {
            let (entered, resolved) = self.resolver.resolve_chain(progress, link)?;
            return self.walk(&entered, &resolved, selector);
        }

        if selector.decide(node) {
            trace!(path = %progress.path, kind = %node.kind(), "visiting node");
            (self.visit)(progress, node)?;
        }

        match selector.interests() {
            Interests::All => match node {
                Node::Map(entries) => {
                    for (key, child) in entries {
                        self.explore_child(progress, node, selector, PathSegment::Key(key.clone()), child)?;
                    }
                }
                Node::List(items) => {
                    for (index, child) in items.iter().enumerate() {
                        self.explore_child(progress, node, selector, PathSegment::Index(index), child)?;
                    }
                }
                _ => {}
            },
            Interests::Only(segments) => {
                for segment in segments.iter() {
                    match node.lookup_segment(segment) {
                        Ok(child) => {
                            self.explore_child(progress, node, selector, segment.clone(), child)?
                        }
                        Err(_) => trace!(path = %progress.path, %segment, "interest absent, pruning"),
                    }
                }
            }
        }
        Ok(())
    }

    fn explore_child(
        &mut self,
        progress: &Progress<'c>,
        node: &Node,
        selector: &Selector,
        segment: PathSegment,
        child: &Node,
    ) -> Result<(), E> {
        match selector.explore(node, &segment) {
            Some(next) => self.walk(&progress.descend(segment), child, &next),
            None => {
                trace!(path = %progress.path, %segment, "selector pruned child");
                Ok(())
            }
        }
    }
}
