//! Declarative selectors over linked data.
//!
//! A selector says which nodes of a graph to visit, as data rather than code.
//! Selectors are parsed from keyed-union nodes (see [`parser`]) or built in
//! code (see [`builder`]), and are then driven against a graph by the
//! traversal engine.
//!
//! # Selector keys
//!
//! - `matcher` - report the current node
//! - `exploreAll` - apply `next` to every child
//! - `exploreFields` - apply a selector per named field
//! - `exploreIndex` - apply `next` to one list element
//! - `exploreRange` - apply `next` to list elements `start..end`
//! - `exploreRecursive` - repeat `sequence` up to `maxDepth` times
//! - `exploreRecursiveEdge` - where the enclosing recursion restarts
//! - `exploreUnion` - a list of selectors applied side by side
//!
//! # Example
//!
//! Every node reachable through "Parents" lists, three generations deep:
//!
//! ```
//! use linkquill::document::codec::decode_json;
//! use linkquill::selector::{Selector, SelectorSpec, SelectorSpecBuilder};
//!
//! let ssb = SelectorSpecBuilder;
//! let spec = ssb.explore_recursive(
//!     3,
//!     ssb.explore_fields(|f| {
//!         f.insert("Parents", ssb.explore_all(ssb.explore_recursive_edge()));
//!     }),
//! );
//!
//! let written = decode_json(
//!     br#"{"exploreRecursive": {
//!         "maxDepth": 3,
//!         "sequence": {"exploreFields": {"fields": {
//!             "Parents": {"exploreAll": {"next": {"exploreRecursiveEdge": {}}}}
//!         }}}
//!     }}"#,
//! )
//! .unwrap();
//! assert_eq!(spec, SelectorSpec::from_node(written));
//!
//! match spec.selector().unwrap() {
//!     Selector::ExploreRecursive(recursive) => assert_eq!(recursive.max_depth(), 3),
//!     other => panic!("unexpected selector {:?}", other),
//! }
//! ```

pub mod ast;
pub mod builder;
pub mod error;
pub mod explore;
pub mod parser;

pub use ast::{
    ExploreAll, ExploreFields, ExploreIndex, ExploreRange, ExploreRecursive, ExploreUnion,
    Interests, Selector,
};
pub use builder::{FieldsSpecBuilder, SelectorSpec, SelectorSpecBuilder};
pub use error::ParseError;
pub use parser::parse_selector;
