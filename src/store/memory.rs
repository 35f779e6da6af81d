//! In-memory block store.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::{Arc, RwLock};

use super::StoreError;
use crate::document::codec::encode_json;
use crate::document::node::{Link, Node};
use crate::traversal::{BoxError, LinkContext, LinkLoader};

/// A block store held in memory.
///
/// Clones share the same blocks, so a store can be handed to a traversal
/// configuration and still be filled afterwards.
///
/// # Example
///
/// ```
/// use linkquill::document::node::Node;
/// use linkquill::store::MemoryStore;
///
/// let store = MemoryStore::new();
/// let link = store.put_node(&Node::from("alpha")).unwrap();
/// assert_eq!(store.get(&link).unwrap(), b"\"alpha\"".to_vec());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blocks: Arc<RwLock<HashMap<Link, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw block bytes and returns their link.
    pub fn put(&self, bytes: Vec<u8>) -> Link {
        let link = Link::for_bytes(&bytes);
        self.blocks
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(link.clone(), bytes);
        link
    }

    /// Encodes a node as a block, stores it and returns its link.
    pub fn put_node(&self, node: &Node) -> Result<Link, StoreError> {
        Ok(self.put(encode_json(node)?))
    }

    pub fn get(&self, link: &Link) -> Result<Vec<u8>, StoreError> {
        self.blocks
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(link)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(link.clone()))
    }

    pub fn contains(&self, link: &Link) -> bool {
        self.blocks
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(link)
    }

    pub fn len(&self) -> usize {
        self.blocks
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LinkLoader for MemoryStore {
    fn load(&self, link: &Link, _ctx: &LinkContext<'_>) -> Result<Box<dyn Read>, BoxError> {
        Ok(Box::new(Cursor::new(self.get(link)?)))
    }
}
