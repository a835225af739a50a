//! Node identifiers.

use serde::{Deserialize, Serialize};

/// Dense node identifier: an index into `0..node_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Slice index of this node. Ids that do not fit in `usize` map to
    /// `usize::MAX`, which no slice can contain.
    pub fn index(self) -> usize {
        index_of(self.0)
    }
}

/// `u64` id to slice index, saturating instead of truncating.
pub(crate) fn index_of(id: u64) -> usize {
    usize::try_from(id).unwrap_or(usize::MAX)
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(n: u64) -> Self {
        NodeId(n)
    }
}

impl From<NodeId> for u64 {
    fn from(n: NodeId) -> Self {
        n.0
    }
}
