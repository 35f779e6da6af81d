//! LinkQuill - declarative selectors and lazy traversal over linked data.
//!
//! A document is a tree of [`document::Node`] values whose leaves may be
//! [`document::Link`]s to other blocks. A [`selector::Selector`] describes
//! which parts of that graph to reach, and [`traversal`] walks the graph,
//! loading only the blocks the selector actually needs.
//!
//! - [`document`] - the node model, paths and the block codec
//! - [`selector`] - the selector algebra, its keyed-union parser and builder
//! - [`traversal`] - the executor, link loaders and progress tracking
//! - [`store`] - in-memory and directory block stores
//! - [`config`] - user configuration

pub mod config;
pub mod document;
pub mod selector;
pub mod store;
pub mod traversal;
