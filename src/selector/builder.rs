//! Building selector specs in code.
//!
//! `SelectorSpecBuilder` produces the same keyed-union nodes the parser
//! reads, so a selector written in Rust goes through the same validation as
//! one loaded from a file. `Selector::to_spec` goes the other way.
//!
//! # Example
//!
//! ```
//! use linkquill::selector::SelectorSpecBuilder;
//!
//! let ssb = SelectorSpecBuilder;
//! let spec = ssb.explore_recursive(
//!     3,
//!     ssb.explore_union([ssb.matcher(), ssb.explore_all(ssb.explore_recursive_edge())]),
//! );
//! let selector = spec.selector().unwrap();
//! assert_eq!(selector.to_spec(), spec);
//! ```

use indexmap::IndexMap;

use super::ast::Selector;
use super::error::ParseError;
use super::parser::{
    parse_selector, END_KEY, EXPLORE_ALL_KEY, EXPLORE_FIELDS_KEY, EXPLORE_INDEX_KEY,
    EXPLORE_RANGE_KEY, EXPLORE_RECURSIVE_EDGE_KEY, EXPLORE_RECURSIVE_KEY, EXPLORE_UNION_KEY,
    FIELDS_KEY, INDEX_KEY, MATCHER_KEY, MAX_DEPTH_KEY, NEXT_KEY, SEQUENCE_KEY, START_KEY,
};
use crate::document::node::Node;

/// A selector in its serialized keyed-union form.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorSpec(Node);

impl SelectorSpec {
    /// Wraps a node without checking it; `selector()` does the checking.
    pub fn from_node(node: Node) -> Self {
        SelectorSpec(node)
    }

    pub fn node(&self) -> &Node {
        &self.0
    }

    pub fn into_node(self) -> Node {
        self.0
    }

    /// Parses the spec into a selector.
    pub fn selector(&self) -> Result<Selector, ParseError> {
        parse_selector(&self.0)
    }
}

fn map_node(entries: Vec<(&str, Node)>) -> Node {
    Node::Map(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}

fn union(key: &str, body: Node) -> SelectorSpec {
    SelectorSpec(map_node(vec![(key, body)]))
}

fn count(n: usize) -> Node {
    Node::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

/// Builds selector specs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectorSpecBuilder;

impl SelectorSpecBuilder {
    pub fn matcher(&self) -> SelectorSpec {
        union(MATCHER_KEY, map_node(vec![]))
    }

    pub fn explore_all(&self, next: SelectorSpec) -> SelectorSpec {
        union(EXPLORE_ALL_KEY, map_node(vec![(NEXT_KEY, next.0)]))
    }

    /// Builds an `exploreFields` spec; fields are added in the closure in
    /// the order they should be visited.
    pub fn explore_fields<F>(&self, build: F) -> SelectorSpec
    where
        F: FnOnce(&mut FieldsSpecBuilder),
    {
        let mut fields = FieldsSpecBuilder::default();
        build(&mut fields);
        union(
            EXPLORE_FIELDS_KEY,
            map_node(vec![(FIELDS_KEY, Node::Map(fields.fields))]),
        )
    }

    pub fn explore_index(&self, index: usize, next: SelectorSpec) -> SelectorSpec {
        union(
            EXPLORE_INDEX_KEY,
            map_node(vec![(INDEX_KEY, count(index)), (NEXT_KEY, next.0)]),
        )
    }

    pub fn explore_range(&self, start: usize, end: usize, next: SelectorSpec) -> SelectorSpec {
        union(
            EXPLORE_RANGE_KEY,
            map_node(vec![
                (START_KEY, count(start)),
                (END_KEY, count(end)),
                (NEXT_KEY, next.0),
            ]),
        )
    }

    pub fn explore_recursive(&self, max_depth: usize, sequence: SelectorSpec) -> SelectorSpec {
        union(
            EXPLORE_RECURSIVE_KEY,
            map_node(vec![
                (MAX_DEPTH_KEY, count(max_depth)),
                (SEQUENCE_KEY, sequence.0),
            ]),
        )
    }

    pub fn explore_recursive_edge(&self) -> SelectorSpec {
        union(EXPLORE_RECURSIVE_EDGE_KEY, map_node(vec![]))
    }

    pub fn explore_union<I>(&self, members: I) -> SelectorSpec
    where
        I: IntoIterator<Item = SelectorSpec>,
    {
        union(
            EXPLORE_UNION_KEY,
            Node::List(members.into_iter().map(|m| m.0).collect()),
        )
    }
}

/// Collects the fields of an `exploreFields` spec.
#[derive(Debug, Default)]
pub struct FieldsSpecBuilder {
    fields: IndexMap<String, Node>,
}

impl FieldsSpecBuilder {
    pub fn insert(&mut self, field: impl Into<String>, spec: SelectorSpec) -> &mut Self {
        self.fields.insert(field.into(), spec.0);
        self
    }
}

impl Selector {
    /// Serializes the selector back into its spec form.
    ///
    /// A recursive selector serializes its body and remaining depth; where
    /// it currently is inside the body is traversal state and is dropped.
    /// Range interests are rebuilt from `start` and `end` on parse.
    pub fn to_spec(&self) -> SelectorSpec {
        let ssb = SelectorSpecBuilder;
        match self {
            Selector::Matcher => ssb.matcher(),
            Selector::ExploreAll(s) => ssb.explore_all(s.next.to_spec()),
            Selector::ExploreFields(s) => ssb.explore_fields(|fields| {
                for (key, selector) in &s.selections {
                    fields.insert(key.clone(), selector.to_spec());
                }
            }),
            Selector::ExploreIndex(s) => ssb.explore_index(s.index, s.next.to_spec()),
            Selector::ExploreRange(s) => ssb.explore_range(s.start, s.end, s.next.to_spec()),
            Selector::ExploreRecursive(s) => {
                ssb.explore_recursive(s.max_depth, s.sequence.to_spec())
            }
            Selector::ExploreRecursiveEdge => ssb.explore_recursive_edge(),
            Selector::ExploreUnion(s) => {
                ssb.explore_union(s.members.iter().map(|member| member.to_spec()))
            }
        }
    }
}
