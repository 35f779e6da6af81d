//! Paths from a traversal root to a node.
//!
//! A `Path` is an ordered sequence of `PathSegment`s. Each segment is either
//! a map key or a list index. Paths are values: `join` returns a new path and
//! never changes the one it was called on, so a path handed to a visitor
//! stays valid for as long as the visitor holds it.
//!
//! # Example
//!
//! ```
//! use linkquill::document::path::{Path, PathSegment};
//!
//! let root = Path::root();
//! let nested = root.join("nested").join(PathSegment::Index(2));
//! assert_eq!(nested.to_string(), "nested/2");
//! assert!(root.is_root());
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// One step in a path: a map key or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Map key
    Key(String),
    /// List index
    Index(usize),
}

impl PathSegment {
    /// Returns the segment as a list index.
    ///
    /// Key segments holding a base-10 integer coerce to an index.
    pub fn index(&self) -> Option<usize> {
        match self {
            PathSegment::Index(i) => Some(*i),
            PathSegment::Key(key) => key.parse().ok(),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// One link in a path's parent chain.
#[derive(Debug)]
struct Step {
    parent: Option<Arc<Step>>,
    segment: PathSegment,
    len: usize,
}

/// An ordered route from the traversal root.
///
/// Joined paths share their prefix with the path they were joined from, so
/// `join` costs the same at any depth.
#[derive(Clone, Default)]
pub struct Path {
    tip: Option<Arc<Step>>,
}

impl Path {
    /// The empty path.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(segments: Vec<PathSegment>) -> Self {
        segments
            .into_iter()
            .fold(Path::root(), |path, segment| path.join(segment))
    }

    /// Parses a `/`-separated path. Every segment is kept as a key; list
    /// lookups coerce numeric keys.
    pub fn parse(s: &str) -> Self {
        s.split('/')
            .filter(|part| !part.is_empty())
            .fold(Path::root(), |path, part| path.join(part))
    }

    /// Returns a new path with `segment` appended.
    pub fn join(&self, segment: impl Into<PathSegment>) -> Path {
        Path {
            tip: Some(Arc::new(Step {
                parent: self.tip.clone(),
                segment: segment.into(),
                len: self.len() + 1,
            })),
        }
    }

    /// Segments from the root outward.
    pub fn segments(&self) -> Vec<PathSegment> {
        self.iter().cloned().collect()
    }

    /// Iterates over the segments from the root outward.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &PathSegment> {
        let mut reversed: Vec<&PathSegment> = Vec::with_capacity(self.len());
        let mut step = self.tip.as_deref();
        while let Some(current) = step {
            reversed.push(&current.segment);
            step = current.parent.as_deref();
        }
        reversed.into_iter().rev()
    }

    pub fn len(&self) -> usize {
        self.tip.as_ref().map_or(0, |step| step.len)
    }

    pub fn is_empty(&self) -> bool {
        self.tip.is_none()
    }

    pub fn is_root(&self) -> bool {
        self.tip.is_none()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.tip.as_ref().map(|step| &step.segment)
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        let mut left = self.tip.as_ref();
        let mut right = other.tip.as_ref();
        loop {
            match (left, right) {
                (None, None) => return true,
                (Some(a), Some(b)) => {
                    if Arc::ptr_eq(a, b) {
                        return true;
                    }
                    if a.len != b.len || a.segment != b.segment {
                        return false;
                    }
                    left = a.parent.as_ref();
                    right = b.parent.as_ref();
                }
                _ => return false,
            }
        }
    }
}

impl Eq for Path {}

impl Hash for Path {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for segment in self.iter() {
            segment.hash(state);
        }
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}
