use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::destination::{AnyDestination, EncodeError, EncodedDestination};

/// The ordered back-stack of one navigation root.
///
/// Entries run from the oldest push at index 0 to the currently visible
/// leaf at the end. The path stores destinations opaquely: it counts,
/// appends and truncates them, and never inspects their contents.
///
/// Growth is unbounded by default; [`with_max_depth`](Self::with_max_depth)
/// opts into a capacity limit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigationPath {
    entries: SmallVec<[AnyDestination; 8]>,
    max_depth: Option<usize>,
}

impl NavigationPath {
    /// An empty, unbounded path.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty path that refuses to grow beyond `limit` entries.
    pub fn with_max_depth(limit: usize) -> Self {
        Self {
            entries: SmallVec::new(),
            max_depth: Some(limit),
        }
    }

    /// Change the depth limit. Applies to future pushes only; entries
    /// already past a newly lowered limit stay in place.
    pub fn set_max_depth(&mut self, limit: Option<usize>) {
        self.max_depth = limit;
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[AnyDestination] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AnyDestination> {
        self.entries.iter()
    }

    /// The currently visible leaf entry, if any.
    pub fn last(&self) -> Option<&AnyDestination> {
        self.entries.last()
    }

    /// Append a destination at the tail.
    ///
    /// Only fails on a depth-limited path that is already full; nothing is
    /// added in that case.
    pub fn push(&mut self, destination: AnyDestination) -> Result<(), PathError> {
        if let Some(limit) = self.max_depth {
            if self.entries.len() >= limit {
                return Err(PathError::CapacityExceeded { limit });
            }
        }
        self.entries.push(destination);
        Ok(())
    }

    /// Remove `count` entries from the tail.
    ///
    /// A count larger than the current depth removes nothing and reports
    /// [`PathError::PopCountExceedsDepth`]; the path is never left in a
    /// partially popped state.
    pub fn pop_last(&mut self, count: usize) -> Result<(), PathError> {
        let depth = self.entries.len();
        if count > depth {
            return Err(PathError::PopCountExceedsDepth {
                requested: count,
                depth,
            });
        }
        self.entries.truncate(depth - count);
        Ok(())
    }

    /// Truncate to empty. Always succeeds; the depth limit is kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Encode every entry, oldest first.
    pub fn encode(&self) -> Result<EncodedPath, EncodeError> {
        self.entries
            .iter()
            .map(AnyDestination::encode)
            .collect::<Result<_, _>>()
            .map(EncodedPath)
    }
}

impl FromIterator<AnyDestination> for NavigationPath {
    fn from_iter<I: IntoIterator<Item = AnyDestination>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
            max_depth: None,
        }
    }
}

impl<'a> IntoIterator for &'a NavigationPath {
    type Item = &'a AnyDestination;
    type IntoIter = std::slice::Iter<'a, AnyDestination>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A whole path in encoded form, oldest entry first.
///
/// Decoding goes through [`Resolver::decode_path`](crate::resolver::Resolver::decode_path),
/// which knows the registered destination types.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodedPath(pub Vec<EncodedDestination>);

impl EncodedPath {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A path mutation that could not be applied. The path is unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathError {
    /// A pop asked for more entries than the path holds.
    PopCountExceedsDepth { requested: usize, depth: usize },
    /// A push would grow a depth-limited path past its limit.
    CapacityExceeded { limit: usize },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::PopCountExceedsDepth { requested, depth } => {
                write!(f, "cannot pop {requested} entries from a path of depth {depth}")
            }
            PathError::CapacityExceeded { limit } => {
                write!(f, "path is at its maximum depth of {limit}")
            }
        }
    }
}

impl std::error::Error for PathError {}
