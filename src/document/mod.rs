//! The generic linked-data model consumed by selectors and traversal.
//!
//! - [`node`] - the `Node` enum, its kinds, links and lookup errors
//! - [`path`] - path segments and paths from the traversal root
//! - [`codec`] - DAG-JSON style block decoding and encoding

pub mod codec;
pub mod node;
pub mod path;

pub use node::{Kind, Link, Node, NodeError};
pub use path::{Path, PathSegment};
