//! Generic node representation for linked data.
//!
//! Every value linkquill traverses is a `Node`: one of a closed set of kinds
//! (null, booleans, integers, floats, strings, byte strings, lists, maps and
//! links). Maps preserve insertion order, lists preserve index order, and
//! links carry an opaque content address that must be resolved through a
//! loader before the linked data can be traversed.
//!
//! # Example
//!
//! ```
//! use linkquill::document::node::{Kind, Node};
//! use indexmap::IndexMap;
//!
//! let mut fields = IndexMap::new();
//! fields.insert("name".to_string(), Node::String("linkquill".to_string()));
//! fields.insert("version".to_string(), Node::Int(2));
//! let map = Node::Map(fields);
//!
//! assert_eq!(map.kind(), Kind::Map);
//! assert_eq!(map.lookup_field("version").unwrap().as_int().unwrap(), 2);
//! ```

use std::fmt;

use indexmap::IndexMap;
use thiserror::Error;

use super::path::PathSegment;

/// The kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Bytes,
    List,
    Map,
    Link,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Bytes => "bytes",
            Kind::List => "list",
            Kind::Map => "map",
            Kind::Link => "link",
        };
        f.write_str(name)
    }
}

/// An opaque content address pointing at another block of data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Link(String);

impl Link {
    /// Wraps an existing address.
    pub fn new(address: impl Into<String>) -> Self {
        Link(address.into())
    }

    /// Derives the content address of a block of bytes.
    ///
    /// ```
    /// use linkquill::document::node::Link;
    ///
    /// let a = Link::for_bytes(b"\"alpha\"");
    /// let b = Link::for_bytes(b"\"alpha\"");
    /// assert_eq!(a, b);
    /// assert!(a.as_str().starts_with("b3-"));
    /// ```
    pub fn for_bytes(bytes: &[u8]) -> Self {
        Link(format!("b3-{}", blake3::hash(bytes).to_hex()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors raised by node lookups and coercions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    /// The node is not of the kind the operation requires.
    #[error("kind mismatch: expected {expected}, found {actual}")]
    KindMismatch { expected: &'static str, actual: Kind },
    /// The requested key or index does not exist.
    #[error("no child at {segment}")]
    NotFound { segment: PathSegment },
}

/// A value in the generic linked-data model.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Node>),
    Map(IndexMap<String, Node>),
    Link(Link),
}

impl Node {
    /// Returns the kind of this node.
    pub fn kind(&self) -> Kind {
        match self {
            Node::Null => Kind::Null,
            Node::Bool(_) => Kind::Bool,
            Node::Int(_) => Kind::Int,
            Node::Float(_) => Kind::Float,
            Node::String(_) => Kind::String,
            Node::Bytes(_) => Kind::Bytes,
            Node::List(_) => Kind::List,
            Node::Map(_) => Kind::Map,
            Node::Link(_) => Kind::Link,
        }
    }

    /// Returns true for lists and maps.
    pub fn is_container(&self) -> bool {
        matches!(self, Node::List(_) | Node::Map(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    fn mismatch(&self, expected: &'static str) -> NodeError {
        NodeError::KindMismatch {
            expected,
            actual: self.kind(),
        }
    }

    /// Looks up a map entry by key.
    pub fn lookup_field(&self, key: &str) -> Result<&Node, NodeError> {
        match self {
            Node::Map(entries) => entries.get(key).ok_or_else(|| NodeError::NotFound {
                segment: PathSegment::Key(key.to_string()),
            }),
            _ => Err(self.mismatch("map")),
        }
    }

    /// Looks up a list element by index.
    pub fn lookup_index(&self, index: usize) -> Result<&Node, NodeError> {
        match self {
            Node::List(items) => items.get(index).ok_or(NodeError::NotFound {
                segment: PathSegment::Index(index),
            }),
            _ => Err(self.mismatch("list")),
        }
    }

    /// Looks up a child by path segment.
    ///
    /// Maps are addressed by the segment's string form; lists accept index
    /// segments and key segments holding a base-10 integer.
    ///
    /// ```
    /// use linkquill::document::node::Node;
    /// use linkquill::document::path::PathSegment;
    ///
    /// let list = Node::List(vec![Node::Bool(true), Node::Bool(false)]);
    /// assert_eq!(list.lookup_segment(&PathSegment::Index(1)).unwrap(), &Node::Bool(false));
    /// assert_eq!(list.lookup_segment(&PathSegment::from("0")).unwrap(), &Node::Bool(true));
    /// ```
    pub fn lookup_segment(&self, segment: &PathSegment) -> Result<&Node, NodeError> {
        match self {
            Node::Map(_) => match segment {
                PathSegment::Key(key) => self.lookup_field(key),
                PathSegment::Index(index) => self.lookup_field(&index.to_string()),
            },
            Node::List(_) => match segment.index() {
                Some(index) => self.lookup_index(index),
                None => Err(NodeError::NotFound {
                    segment: segment.clone(),
                }),
            },
            _ => Err(self.mismatch("map or list")),
        }
    }

    /// Returns the number of entries, elements, characters' bytes or bytes.
    pub fn len(&self) -> Result<usize, NodeError> {
        match self {
            Node::Map(entries) => Ok(entries.len()),
            Node::List(items) => Ok(items.len()),
            Node::String(s) => Ok(s.len()),
            Node::Bytes(b) => Ok(b.len()),
            _ => Err(self.mismatch("map, list, string or bytes")),
        }
    }

    /// Returns true if `len()` is zero; scalars without a length are not empty.
    pub fn is_empty(&self) -> bool {
        self.len().map(|len| len == 0).unwrap_or(false)
    }

    /// Iterates map entries in insertion order.
    pub fn map_iter(&self) -> Result<indexmap::map::Iter<'_, String, Node>, NodeError> {
        match self {
            Node::Map(entries) => Ok(entries.iter()),
            _ => Err(self.mismatch("map")),
        }
    }

    /// Iterates list elements in index order.
    pub fn list_iter(&self) -> Result<std::slice::Iter<'_, Node>, NodeError> {
        match self {
            Node::List(items) => Ok(items.iter()),
            _ => Err(self.mismatch("list")),
        }
    }

    pub fn as_bool(&self) -> Result<bool, NodeError> {
        match self {
            Node::Bool(b) => Ok(*b),
            _ => Err(self.mismatch("bool")),
        }
    }

    pub fn as_int(&self) -> Result<i64, NodeError> {
        match self {
            Node::Int(i) => Ok(*i),
            _ => Err(self.mismatch("int")),
        }
    }

    pub fn as_float(&self) -> Result<f64, NodeError> {
        match self {
            Node::Float(f) => Ok(*f),
            _ => Err(self.mismatch("float")),
        }
    }

    pub fn as_string(&self) -> Result<&str, NodeError> {
        match self {
            Node::String(s) => Ok(s),
            _ => Err(self.mismatch("string")),
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8], NodeError> {
        match self {
            Node::Bytes(b) => Ok(b),
            _ => Err(self.mismatch("bytes")),
        }
    }

    pub fn as_link(&self) -> Result<&Link, NodeError> {
        match self {
            Node::Link(link) => Ok(link),
            _ => Err(self.mismatch("link")),
        }
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_string())
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}

impl From<i64> for Node {
    fn from(i: i64) -> Self {
        Node::Int(i)
    }
}

impl From<Link> for Node {
    fn from(link: Link) -> Self {
        Node::Link(link)
    }
}
