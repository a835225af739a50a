//! Edge identifiers and per-node edge ranges.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};
use super::node::index_of;

/// Position of an edge in the flattened destination array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct EdgeId(pub u64);

impl EdgeId {
    /// Slice index of this edge. Ids that do not fit in `usize` map to
    /// `usize::MAX`, which no slice can contain.
    pub fn index(self) -> usize {
        index_of(self.0)
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Half-open slice `[begin, end)` of the edge array owned by one node.
///
/// `begin <= end` always holds; a node without out-edges gets an empty
/// range positioned where its edges would start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "RawEdgeRange")]
pub struct EdgeRange {
    begin: u64,
    end: u64,
}

/// Unchecked wire form of `EdgeRange`.
#[derive(Deserialize)]
struct RawEdgeRange {
    begin: u64,
    end: u64,
}

impl TryFrom<RawEdgeRange> for EdgeRange {
    type Error = Error;

    fn try_from(raw: RawEdgeRange) -> Result<Self> {
        EdgeRange::try_new(raw.begin, raw.end)
    }
}

impl EdgeRange {
    /// # Panics
    ///
    /// Panics if `begin > end`. Use `try_new` for untrusted bounds.
    pub fn new(begin: u64, end: u64) -> Self {
        assert!(begin <= end, "edge range [{begin}, {end}) is inverted");
        Self { begin, end }
    }

    /// Fails with `Error::InvalidTopology` if `begin > end`.
    pub fn try_new(begin: u64, end: u64) -> Result<Self> {
        if begin > end {
            return Err(Error::InvalidTopology(format!(
                "edge range [{begin}, {end}) is inverted"
            )));
        }
        Ok(Self { begin, end })
    }

    pub fn begin(&self) -> u64 {
        self.begin
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn len(&self) -> u64 {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    pub fn contains(&self, edge: EdgeId) -> bool {
        self.begin <= edge.0 && edge.0 < self.end
    }

    /// Edge ids in this range, in storage order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = EdgeId> + use<> {
        (self.begin..self.end).map(EdgeId)
    }

    /// Usable directly as a slice index into the destination array.
    /// Bounds past `usize::MAX` saturate, so slicing fails instead of wrapping.
    pub fn as_usize_range(&self) -> Range<usize> {
        index_of(self.begin)..index_of(self.end)
    }
}

impl From<EdgeRange> for Range<u64> {
    fn from(r: EdgeRange) -> Self {
        r.begin..r.end
    }
}

impl From<EdgeRange> for (u64, u64) {
    fn from(r: EdgeRange) -> Self {
        (r.begin, r.end)
    }
}

impl IntoIterator for EdgeRange {
    type Item = EdgeId;
    type IntoIter = std::iter::Map<Range<u64>, fn(u64) -> EdgeId>;

    fn into_iter(self) -> Self::IntoIter {
        (self.begin..self.end).map(EdgeId as fn(u64) -> EdgeId)
    }
}
