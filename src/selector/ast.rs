//! Selector types.
//!
//! A `Selector` is an immutable value. Child selectors are held behind `Arc`
//! so that advancing a selector during traversal builds new values that share
//! the unchanged parts, most importantly the body of a recursive selector.

use std::borrow::Cow;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::document::path::PathSegment;

/// A declarative description of which nodes to visit.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Reports the current node and explores nothing below it.
    Matcher,
    /// Applies `next` to every child.
    ExploreAll(ExploreAll),
    /// Applies a per-field selector to named children.
    ExploreFields(ExploreFields),
    /// Applies `next` to one list element.
    ExploreIndex(ExploreIndex),
    /// Applies `next` to a half-open range of list elements.
    ExploreRange(ExploreRange),
    /// Repeats a selector body up to a maximum depth.
    ExploreRecursive(ExploreRecursive),
    /// Marks where the enclosing `ExploreRecursive` body restarts.
    ExploreRecursiveEdge,
    /// Combines several selectors at the same position.
    ExploreUnion(ExploreUnion),
}

/// The child segments a selector wants to look at.
#[derive(Debug, Clone, PartialEq)]
pub enum Interests<'a> {
    /// Every child the node actually has.
    All,
    /// Only these segments, in this order.
    Only(Cow<'a, [PathSegment]>),
}

impl<'a> Interests<'a> {
    pub fn none() -> Self {
        Interests::Only(Cow::Borrowed(&[]))
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Interests::All)
    }

    /// Returns true if `segment` is one of the interests.
    pub fn contains(&self, segment: &PathSegment) -> bool {
        match self {
            Interests::All => true,
            Interests::Only(segments) => segments.contains(segment),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExploreAll {
    pub(crate) next: Arc<Selector>,
}

impl ExploreAll {
    pub fn new(next: impl Into<Arc<Selector>>) -> Self {
        Self { next: next.into() }
    }

    pub fn next(&self) -> &Arc<Selector> {
        &self.next
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExploreFields {
    pub(crate) selections: IndexMap<String, Arc<Selector>>,
    pub(crate) interests: Vec<PathSegment>,
}

impl ExploreFields {
    /// Builds a field selector; interests follow the order fields are given.
    /// A repeated key keeps its first position and its last selector.
    pub fn new<I, K, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<Arc<Selector>>,
    {
        let selections: IndexMap<String, Arc<Selector>> = fields
            .into_iter()
            .map(|(key, selector)| (key.into(), selector.into()))
            .collect();
        let interests = selections
            .keys()
            .map(|key| PathSegment::Key(key.clone()))
            .collect();
        Self {
            selections,
            interests,
        }
    }

    pub fn selections(&self) -> &IndexMap<String, Arc<Selector>> {
        &self.selections
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExploreIndex {
    pub(crate) next: Arc<Selector>,
    pub(crate) index: usize,
    pub(crate) interest: [PathSegment; 1],
}

impl ExploreIndex {
    pub fn new(index: usize, next: impl Into<Arc<Selector>>) -> Self {
        Self {
            next: next.into(),
            index,
            interest: [PathSegment::Index(index)],
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn next(&self) -> &Arc<Selector> {
        &self.next
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExploreRange {
    pub(crate) next: Arc<Selector>,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) interests: Vec<PathSegment>,
}

impl ExploreRange {
    /// Builds a range selector over `[start, end)`.
    ///
    /// The interest list is materialized up front, so memory grows with
    /// `end - start`. An empty or inverted range has no interests; the parser
    /// rejects those before they get here.
    pub fn new(start: usize, end: usize, next: impl Into<Arc<Selector>>) -> Self {
        let interests = (start..end).map(PathSegment::Index).collect();
        Self {
            next: next.into(),
            start,
            end,
            interests,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn next(&self) -> &Arc<Selector> {
        &self.next
    }
}

/// A bounded recursion over a selector body.
///
/// `sequence` is the static body. `current` is the position reached inside
/// the body at this point of the traversal. When exploration reaches an
/// `ExploreRecursiveEdge`, `current` restarts at `sequence` and `max_depth`
/// goes down by one; at depth zero the edge prunes instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ExploreRecursive {
    pub(crate) sequence: Arc<Selector>,
    pub(crate) current: Arc<Selector>,
    pub(crate) max_depth: usize,
}

impl ExploreRecursive {
    pub fn new(max_depth: usize, sequence: impl Into<Arc<Selector>>) -> Self {
        let sequence = sequence.into();
        Self {
            current: Arc::clone(&sequence),
            sequence,
            max_depth,
        }
    }

    /// Rebuilds a recursive selector that is part-way through its body.
    pub fn from_parts(
        sequence: impl Into<Arc<Selector>>,
        current: impl Into<Arc<Selector>>,
        max_depth: usize,
    ) -> Self {
        Self {
            sequence: sequence.into(),
            current: current.into(),
            max_depth,
        }
    }

    pub fn sequence(&self) -> &Arc<Selector> {
        &self.sequence
    }

    pub fn current(&self) -> &Arc<Selector> {
        &self.current
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExploreUnion {
    pub(crate) members: Vec<Arc<Selector>>,
}

impl ExploreUnion {
    pub fn new<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<Selector>>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn members(&self) -> &[Arc<Selector>] {
        &self.members
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Selector {
                fn from(s: $variant) -> Self {
                    Selector::$variant(s)
                }
            }

            impl From<$variant> for Arc<Selector> {
                fn from(s: $variant) -> Self {
                    Arc::new(Selector::$variant(s))
                }
            }
        )*
    };
}

impl_from_variant!(
    ExploreAll,
    ExploreFields,
    ExploreIndex,
    ExploreRange,
    ExploreRecursive,
    ExploreUnion
);
