//! Error types for selector spec parsing.

use thiserror::Error;

use crate::document::node::Kind;

/// Reasons a selector spec is rejected.
///
/// A nested selector that fails to parse aborts the whole parse with the
/// nested error unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The outer keyed union is not a map.
    #[error("selector spec parse rejected: selector is a keyed union and thus must be a map")]
    UnionNotAMap { actual: Kind },
    /// The outer keyed union does not have exactly one entry.
    #[error(
        "selector spec parse rejected: selector is a keyed union and thus must be a single-entry map"
    )]
    UnionNotSingleEntry { entries: usize },
    /// The union key names no known selector.
    #[error(
        "selector spec parse rejected: selector union key {0:?} must match one of the known selector keys"
    )]
    UnknownUnionKey(String),
    /// A selector body that should be a map is not.
    #[error("selector spec parse rejected: selector body must be a map")]
    BodyNotAMap { selector: &'static str },
    /// The body of an ExploreUnion is not a list.
    #[error("selector spec parse rejected: explore union selector must be a list")]
    UnionBodyNotAList,
    /// A required field is absent.
    #[error(
        "selector spec parse rejected: {field} field must be present in {selector} selector"
    )]
    MissingField {
        selector: &'static str,
        field: &'static str,
    },
    /// A field is present with the wrong kind.
    #[error("selector spec parse rejected: {field} field must be a {expected} in {selector} selector")]
    WrongFieldKind {
        selector: &'static str,
        field: &'static str,
        expected: &'static str,
    },
    /// An integer field that counts or indexes is negative.
    #[error(
        "selector spec parse rejected: {field} field must not be negative in {selector} selector (got {value})"
    )]
    NegativeField {
        selector: &'static str,
        field: &'static str,
        value: i64,
    },
    /// An ExploreRange whose end does not come after its start.
    #[error(
        "selector spec parse rejected: end field must be greater than start field in ExploreRange selector"
    )]
    EmptyRange { start: usize, end: usize },
}
