//! Selector spec parser.
//!
//! A selector spec is a keyed union: a map with exactly one entry whose key
//! names the selector and whose value is that selector's body. For example
//! `{"exploreRange": {"start": 0, "end": 3, "next": {"matcher": {}}}}`.
//!
//! The parser checks shapes only. In particular an `exploreRecursiveEdge`
//! with no enclosing `exploreRecursive` is accepted; it prunes when traversed.

use std::sync::Arc;

use super::ast::{
    ExploreAll, ExploreFields, ExploreIndex, ExploreRange, ExploreRecursive, ExploreUnion,
    Selector,
};
use super::error::ParseError;
use crate::document::node::{Kind, Node};

pub const MATCHER_KEY: &str = "matcher";
pub const EXPLORE_ALL_KEY: &str = "exploreAll";
pub const EXPLORE_FIELDS_KEY: &str = "exploreFields";
pub const EXPLORE_INDEX_KEY: &str = "exploreIndex";
pub const EXPLORE_RANGE_KEY: &str = "exploreRange";
pub const EXPLORE_RECURSIVE_KEY: &str = "exploreRecursive";
pub const EXPLORE_RECURSIVE_EDGE_KEY: &str = "exploreRecursiveEdge";
pub const EXPLORE_UNION_KEY: &str = "exploreUnion";

pub const NEXT_KEY: &str = "next";
pub const FIELDS_KEY: &str = "fields";
pub const INDEX_KEY: &str = "index";
pub const START_KEY: &str = "start";
pub const END_KEY: &str = "end";
pub const SEQUENCE_KEY: &str = "sequence";
pub const MAX_DEPTH_KEY: &str = "maxDepth";

type BodyParser = fn(&Node) -> Result<Selector, ParseError>;

/// Union key to body parser.
const UNION_MEMBERS: &[(&str, BodyParser)] = &[
    (MATCHER_KEY, parse_matcher),
    (EXPLORE_ALL_KEY, parse_explore_all),
    (EXPLORE_FIELDS_KEY, parse_explore_fields),
    (EXPLORE_INDEX_KEY, parse_explore_index),
    (EXPLORE_RANGE_KEY, parse_explore_range),
    (EXPLORE_RECURSIVE_KEY, parse_explore_recursive),
    (EXPLORE_RECURSIVE_EDGE_KEY, parse_explore_recursive_edge),
    (EXPLORE_UNION_KEY, parse_explore_union),
];

/// Parses a selector spec node into a `Selector`.
///
/// # Example
///
/// ```
/// use linkquill::document::codec::decode_json;
/// use linkquill::selector::{parse_selector, Selector};
///
/// let spec = decode_json(br#"{"exploreAll": {"next": {"matcher": {}}}}"#).unwrap();
/// let selector = parse_selector(&spec).unwrap();
/// assert!(matches!(selector, Selector::ExploreAll(_)));
/// ```
pub fn parse_selector(node: &Node) -> Result<Selector, ParseError> {
    let entries = match node {
        Node::Map(entries) => entries,
        other => {
            return Err(ParseError::UnionNotAMap {
                actual: other.kind(),
            })
        }
    };
    if entries.len() != 1 {
        return Err(ParseError::UnionNotSingleEntry {
            entries: entries.len(),
        });
    }
    let Some((key, body)) = entries.iter().next() else {
        return Err(ParseError::UnionNotSingleEntry { entries: 0 });
    };
    let parse_body = UNION_MEMBERS
        .iter()
        .find(|(member, _)| *member == key.as_str())
        .map(|(_, parse)| *parse)
        .ok_or_else(|| ParseError::UnknownUnionKey(key.clone()))?;
    parse_body(body)
}

impl TryFrom<&Node> for Selector {
    type Error = ParseError;

    fn try_from(node: &Node) -> Result<Self, Self::Error> {
        parse_selector(node)
    }
}

fn require_map(body: &Node, selector: &'static str) -> Result<(), ParseError> {
    if body.kind() == Kind::Map {
        Ok(())
    } else {
        Err(ParseError::BodyNotAMap { selector })
    }
}

fn require_field<'a>(
    body: &'a Node,
    selector: &'static str,
    field: &'static str,
) -> Result<&'a Node, ParseError> {
    body.lookup_field(field)
        .map_err(|_| ParseError::MissingField { selector, field })
}

fn require_count(
    body: &Node,
    selector: &'static str,
    field: &'static str,
) -> Result<usize, ParseError> {
    let value = require_field(body, selector, field)?
        .as_int()
        .map_err(|_| ParseError::WrongFieldKind {
            selector,
            field,
            expected: "number",
        })?;
    usize::try_from(value).map_err(|_| ParseError::NegativeField {
        selector,
        field,
        value,
    })
}

fn require_selector(
    body: &Node,
    selector: &'static str,
    field: &'static str,
) -> Result<Arc<Selector>, ParseError> {
    let spec = require_field(body, selector, field)?;
    Ok(Arc::new(parse_selector(spec)?))
}

/// Parses the body of a `matcher` selector.
pub fn parse_matcher(body: &Node) -> Result<Selector, ParseError> {
    require_map(body, "Matcher")?;
    Ok(Selector::Matcher)
}

/// Parses the body of an `exploreAll` selector.
pub fn parse_explore_all(body: &Node) -> Result<Selector, ParseError> {
    const NAME: &str = "ExploreAll";
    require_map(body, NAME)?;
    let next = require_selector(body, NAME, NEXT_KEY)?;
    Ok(Selector::ExploreAll(ExploreAll { next }))
}

/// Parses the body of an `exploreFields` selector.
pub fn parse_explore_fields(body: &Node) -> Result<Selector, ParseError> {
    const NAME: &str = "ExploreFields";
    require_map(body, NAME)?;
    let fields = require_field(body, NAME, FIELDS_KEY)?;
    let entries = fields.map_iter().map_err(|_| ParseError::WrongFieldKind {
        selector: NAME,
        field: FIELDS_KEY,
        expected: "map",
    })?;
    let mut selections = Vec::with_capacity(fields.len().unwrap_or(0));
    for (key, spec) in entries {
        selections.push((key.clone(), Arc::new(parse_selector(spec)?)));
    }
    Ok(Selector::ExploreFields(ExploreFields::new(selections)))
}

/// Parses the body of an `exploreIndex` selector.
pub fn parse_explore_index(body: &Node) -> Result<Selector, ParseError> {
    const NAME: &str = "ExploreIndex";
    require_map(body, NAME)?;
    let index = require_count(body, NAME, INDEX_KEY)?;
    let next = require_selector(body, NAME, NEXT_KEY)?;
    Ok(Selector::ExploreIndex(ExploreIndex::new(index, next)))
}

/// Parses the body of an `exploreRange` selector.
pub fn parse_explore_range(body: &Node) -> Result<Selector, ParseError> {
    const NAME: &str = "ExploreRange";
    require_map(body, NAME)?;
    let start = require_count(body, NAME, START_KEY)?;
    let end = require_count(body, NAME, END_KEY)?;
    if start >= end {
        return Err(ParseError::EmptyRange { start, end });
    }
    let next = require_selector(body, NAME, NEXT_KEY)?;
    Ok(Selector::ExploreRange(ExploreRange::new(start, end, next)))
}

/// Parses the body of an `exploreRecursive` selector.
pub fn parse_explore_recursive(body: &Node) -> Result<Selector, ParseError> {
    const NAME: &str = "ExploreRecursive";
    require_map(body, NAME)?;
    let max_depth = require_count(body, NAME, MAX_DEPTH_KEY)?;
    let sequence = require_selector(body, NAME, SEQUENCE_KEY)?;
    Ok(Selector::ExploreRecursive(ExploreRecursive::new(
        max_depth, sequence,
    )))
}

/// Parses the body of an `exploreRecursiveEdge` selector.
pub fn parse_explore_recursive_edge(body: &Node) -> Result<Selector, ParseError> {
    require_map(body, "ExploreRecursiveEdge")?;
    Ok(Selector::ExploreRecursiveEdge)
}

/// Parses the body of an `exploreUnion` selector: a list of selectors.
pub fn parse_explore_union(body: &Node) -> Result<Selector, ParseError> {
    let members = body
        .list_iter()
        .map_err(|_| ParseError::UnionBodyNotAList)?
        .map(|spec| parse_selector(spec).map(Arc::new))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Selector::ExploreUnion(ExploreUnion::new(members)))
}
