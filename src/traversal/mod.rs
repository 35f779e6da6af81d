//! Selector-driven graph traversal.
//!
//! The executor applies a [`Selector`] to a root node, resolves links through
//! a [`LinkLoader`] as it reaches them, and calls a visitor for every node the
//! selector matches, together with the [`Progress`] that led there.
//!
//! # Example
//!
//! ```
//! use linkquill::document::codec::decode_json;
//! use linkquill::selector::SelectorSpecBuilder;
//! use linkquill::traversal::{traverse, TraversalError};
//!
//! let root = decode_json(br#"{"foo": true, "bar": false, "baz": "x"}"#).unwrap();
//! let ssb = SelectorSpecBuilder;
//! let selector = ssb
//!     .explore_fields(|f| {
//!         f.insert("foo", ssb.matcher());
//!         f.insert("bar", ssb.matcher());
//!     })
//!     .selector()
//!     .unwrap();
//!
//! let mut seen = Vec::new();
//! traverse(&root, &selector, |progress, _node| {
//!     seen.push(progress.path.to_string());
//!     Ok::<(), TraversalError>(())
//! })
//! .unwrap();
//! assert_eq!(seen, vec!["foo", "bar"]);
//! ```

pub mod error;
pub mod loader;
pub mod progress;
mod walk;

pub use error::{BoxError, TraversalError};
pub use loader::{FnLoader, LinkContext, LinkLoader};
pub use progress::{LastBlock, Progress, TraversalConfig};

use crate::document::node::Node;
use crate::selector::Selector;

/// Walks `root` with the default configuration, which has no link loader.
///
/// Reaching a link that the selector wants to explore fails with
/// `TraversalError::NoLoader`; use [`Progress::traverse`] with a configured
/// [`TraversalConfig`] to follow links.
pub fn traverse<F, E>(root: &Node, selector: &Selector, visit: F) -> Result<(), E>
where
    F: for<'c> FnMut(&Progress<'c>, &Node) -> Result<(), E>,
    E: From<TraversalError>,
{
    let config = TraversalConfig::default();
    Progress::new(&config).traverse(root, selector, visit)
}
