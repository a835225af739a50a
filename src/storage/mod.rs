//! # Graph Topology Trait
//!
//! This is THE contract between the topology store and every call site that
//! walks a graph. Specialized code is generated against these operations,
//! so they must stay O(1), side-effect-free, and identical in meaning for
//! every implementation.
//!
//! ## Implementations
//!
//! | Type | Module | Description |
//! |------|--------|-------------|
//! | `CsrTopology` | `csr` | Owns the CSR arrays |
//! | `GraphHandle<T>` | `crate::handle` | Zero-copy typed wrapper over a shared `CsrTopology` |

pub mod csr;
pub mod builder;
pub mod partition;

use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};

use crate::model::{EdgeRange, NodeId};
use crate::Result;

pub use builder::CsrBuilder;
pub use csr::{CsrTopology, OutEdges};
pub use partition::{divide_by_node, divide_range};

// ============================================================================
// Build configuration
// ============================================================================

/// Options applied when a topology is built from loader arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Reject destinations `>= node_count`. Disable only for trusted input.
    pub validate_destinations: bool,
    /// Sort every node's out-edges by destination during the build.
    pub sort_by_dst: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            validate_destinations: true,
            sort_by_dst: false,
        }
    }
}

impl BuildOptions {
    /// Parse options from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// GraphTopology Trait
// ============================================================================

/// The structural contract of a graph-like handle.
///
/// Implementors provide `node_count`, `edge_count` and `edge_range_end`;
/// everything else is derived from those and must not be overridden with
/// different semantics.
pub trait GraphTopology {
    /// Total number of nodes.
    fn node_count(&self) -> u64;

    /// Total number of edges.
    fn edge_count(&self) -> u64;

    /// Exclusive end of `node`'s slice in the edge array.
    ///
    /// Fails with `Error::IndexOutOfRange` when `node >= node_count()`.
    fn edge_range_end(&self, node: NodeId) -> Result<u64>;

    /// Outgoing-edge range `[prev, end)` of `node`, where `prev` is the
    /// previous node's end (0 for node 0).
    ///
    /// Fails with `Error::InvalidTopology` if the ends are not monotone.
    fn out_edges(&self, node: NodeId) -> Result<EdgeRange> {
        let end = self.edge_range_end(node)?;
        let begin = match node.0 {
            0 => 0,
            n => self.edge_range_end(NodeId(n - 1))?,
        };
        EdgeRange::try_new(begin, end)
    }

    /// All node ids `0..node_count()`. Each call starts a fresh pass.
    fn nodes(&self) -> Nodes {
        Nodes::new(self.node_count())
    }

    /// Same as `node_count()`; the length of the graph viewed as a container.
    fn len(&self) -> u64 {
        self.node_count()
    }

    fn is_empty(&self) -> bool {
        self.node_count() == 0
    }
}

// ============================================================================
// Node iteration
// ============================================================================

/// Lazy iterator over `0..count` as `NodeId`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nodes {
    next: u64,
    end: u64,
}

impl Nodes {
    pub fn new(count: u64) -> Self {
        Self { next: 0, end: count }
    }
}

impl Iterator for Nodes {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.next < self.end {
            let n = self.next;
            self.next += 1;
            Some(NodeId(n))
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.end - self.next) {
            Ok(remaining) => (remaining, Some(remaining)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl DoubleEndedIterator for Nodes {
    fn next_back(&mut self) -> Option<NodeId> {
        if self.next < self.end {
            self.end -= 1;
            Some(NodeId(self.end))
        } else {
            None
        }
    }
}

impl ExactSizeIterator for Nodes {}
impl FusedIterator for Nodes {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodes_restartable() {
        let nodes = Nodes::new(4);
        let first: Vec<u64> = nodes.clone().map(|n| n.0).collect();
        let second: Vec<u64> = nodes.map(|n| n.0).collect();
        assert_eq!(first, vec![0, 1, 2, 3]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_nodes_double_ended() {
        let mut nodes = Nodes::new(3);
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes.next_back(), Some(NodeId(2)));
        assert_eq!(nodes.next(), Some(NodeId(0)));
        assert_eq!(nodes.next(), Some(NodeId(1)));
        assert_eq!(nodes.next(), None);
        assert_eq!(nodes.next_back(), None);
    }

    /// Ends that go backwards between nodes 0 and 1.
    struct Broken;

    impl GraphTopology for Broken {
        fn node_count(&self) -> u64 {
            2
        }

        fn edge_count(&self) -> u64 {
            3
        }

        fn edge_range_end(&self, node: NodeId) -> Result<u64> {
            Ok(if node.0 == 0 { 3 } else { 1 })
        }
    }

    #[test]
    fn test_out_edges_rejects_inverted_ends() {
        assert_eq!(Broken.out_edges(NodeId(0)).unwrap().len(), 3);
        assert!(matches!(
            Broken.out_edges(NodeId(1)),
            Err(crate::Error::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_nodes_size_hint_past_usize() {
        let nodes = Nodes { next: 0, end: u64::MAX };
        let (lower, _) = nodes.size_hint();
        assert_eq!(lower, usize::MAX);
    }

    #[test]
    fn test_build_options_from_json() {
        let opts = BuildOptions::from_json(r#"{"sort_by_dst": true}"#).unwrap();
        assert!(opts.sort_by_dst);
        assert!(opts.validate_destinations);

        let defaults = BuildOptions::from_json("{}").unwrap();
        assert_eq!(defaults, BuildOptions::default());

        assert!(matches!(
            BuildOptions::from_json("{not json"),
            Err(crate::Error::Config(_))
        ));
    }
}
