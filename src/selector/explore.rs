//! Exploration semantics for selectors.
//!
//! Every selector answers three questions about the node it is applied to:
//!
//! - `interests` - which children it wants to look at
//! - `explore` - which selector applies to a given child (`None` prunes)
//! - `decide` - whether the node itself is reported
//!
//! None of these fail. A segment of the wrong shape or a node of the wrong
//! kind simply prunes.

use std::borrow::Cow;
use std::sync::Arc;

use tracing::trace;

use super::ast::{ExploreRecursive, ExploreUnion, Interests, Selector};
use crate::document::node::{Kind, Node};
use crate::document::path::PathSegment;

impl Selector {
    /// Returns the child segments this selector cares about.
    pub fn interests(&self) -> Interests<'_> {
        match self {
            Selector::Matcher | Selector::ExploreRecursiveEdge => Interests::none(),
            Selector::ExploreAll(_) => Interests::All,
            Selector::ExploreFields(s) => Interests::Only(Cow::Borrowed(s.interests.as_slice())),
            Selector::ExploreIndex(s) => Interests::Only(Cow::Borrowed(&s.interest[..])),
            Selector::ExploreRange(s) => Interests::Only(Cow::Borrowed(s.interests.as_slice())),
            Selector::ExploreRecursive(s) => s.current.interests(),
            Selector::ExploreUnion(s) => union_interests(s),
        }
    }

    /// Returns the selector to apply to the child at `segment`, or `None` to
    /// skip that child.
    pub fn explore(&self, node: &Node, segment: &PathSegment) -> Option<Arc<Selector>> {
        match self {
            Selector::Matcher | Selector::ExploreRecursiveEdge => None,
            Selector::ExploreAll(s) => Some(Arc::clone(&s.next)),
            Selector::ExploreFields(s) => match segment {
                PathSegment::Key(key) => s.selections.get(key).cloned(),
                PathSegment::Index(i) => s.selections.get(&i.to_string()).cloned(),
            },
            Selector::ExploreIndex(s) => {
                if segment.index() == Some(s.index) {
                    Some(Arc::clone(&s.next))
                } else {
                    None
                }
            }
            Selector::ExploreRange(s) => {
                if node.kind() != Kind::List {
                    return None;
                }
                let index = segment.index()?;
                if index < s.start || index >= s.end {
                    return None;
                }
                Some(Arc::clone(&s.next))
            }
            Selector::ExploreRecursive(s) => s.explore(node, segment),
            Selector::ExploreUnion(s) => s
                .members
                .iter()
                .find_map(|member| member.explore(node, segment)),
        }
    }

    /// Returns true if the node this selector is applied to is reported.
    pub fn decide(&self, node: &Node) -> bool {
        match self {
            Selector::Matcher => true,
            Selector::ExploreRecursive(s) => s.current.decide(node),
            Selector::ExploreUnion(s) => s.members.iter().any(|member| member.decide(node)),
            _ => false,
        }
    }
}

fn union_interests(union: &ExploreUnion) -> Interests<'static> {
    let mut merged: Vec<PathSegment> = Vec::new();
    for member in &union.members {
        match member.interests() {
            Interests::All => return Interests::All,
            Interests::Only(segments) => {
                for segment in segments.iter() {
                    if !merged.contains(segment) {
                        merged.push(segment.clone());
                    }
                }
            }
        }
    }
    Interests::Only(Cow::Owned(merged))
}

impl ExploreRecursive {
    fn explore(&self, node: &Node, segment: &PathSegment) -> Option<Arc<Selector>> {
        let next = self.current.explore(node, segment)?;
        if !has_edge(&next) {
            return Some(self.advance(next, self.max_depth));
        }
        if self.max_depth == 0 {
            trace!(%segment, "recursion depth exhausted, pruning edge");
            let remaining = strip_edges(&next)?;
            return Some(self.advance(remaining, 0));
        }
        let restarted = replace_edges(&next, &self.sequence);
        Some(self.advance(restarted, self.max_depth - 1))
    }

    fn advance(&self, current: Arc<Selector>, max_depth: usize) -> Arc<Selector> {
        Arc::new(Selector::ExploreRecursive(ExploreRecursive {
            sequence: Arc::clone(&self.sequence),
            current,
            max_depth,
        }))
    }
}

/// An edge is reached when explore returns one directly or as a union member.
fn has_edge(selector: &Selector) -> bool {
    match selector {
        Selector::ExploreRecursiveEdge => true,
        Selector::ExploreUnion(union) => union.members.iter().any(|m| has_edge(m)),
        _ => false,
    }
}

fn replace_edges(selector: &Arc<Selector>, sequence: &Arc<Selector>) -> Arc<Selector> {
    match selector.as_ref() {
        Selector::ExploreRecursiveEdge => Arc::clone(sequence),
        Selector::ExploreUnion(union) => Arc::new(Selector::ExploreUnion(ExploreUnion {
            members: union
                .members
                .iter()
                .map(|member| replace_edges(member, sequence))
                .collect(),
        })),
        _ => Arc::clone(selector),
    }
}

fn strip_edges(selector: &Arc<Selector>) -> Option<Arc<Selector>> {
    match selector.as_ref() {
        Selector::ExploreRecursiveEdge => None,
        Selector::ExploreUnion(union) => {
            let members: Vec<Arc<Selector>> =
                union.members.iter().filter_map(strip_edges).collect();
            if members.is_empty() {
                None
            } else {
                Some(Arc::new(Selector::ExploreUnion(ExploreUnion { members })))
            }
        }
        _ => Some(Arc::clone(selector)),
    }
}
