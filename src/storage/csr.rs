//! Compressed sparse-row topology store.
//!
//! The reference implementation of `GraphTopology`. Two flat arrays:
//!
//! ```text
//! edge_ends: [e0, e1, ..., e(n-1)]      e(i) = exclusive end of node i's edges
//! edge_dst:  [d0, d1, ..., d(m-1)]      destination of each edge
//!
//! out_edges(i) = [ i == 0 ? 0 : e(i-1), e(i) )
//! ```
//!
//! Only the end of each slice is stored; the begin is the previous node's
//! end. `e(n-1) == m` always holds.
//!
//! The store is immutable. Operations that "change" the graph
//! (`sorted_by_dst`, `transpose`) build a new one.

use std::iter::FusedIterator;

use tracing::debug;

use crate::model::{EdgeId, EdgeRange, NodeId};
use crate::{Error, Result};
use super::builder::prefix_sum;
use super::{BuildOptions, GraphTopology};

// ============================================================================
// CsrTopology
// ============================================================================

/// Immutable directed graph in CSR form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrTopology {
    edge_ends: Box<[u64]>,
    edge_dst: Box<[NodeId]>,
    sorted_by_dst: bool,
}

impl Default for CsrTopology {
    fn default() -> Self {
        Self {
            edge_ends: Box::default(),
            edge_dst: Box::default(),
            sorted_by_dst: true,
        }
    }
}

impl CsrTopology {
    /// Build from loader arrays with default options.
    ///
    /// `edge_ends` holds one monotone non-decreasing entry per node, the last
    /// equal to `edge_dst.len()`.
    pub fn from_raw(edge_ends: Vec<u64>, edge_dst: Vec<u64>) -> Result<Self> {
        Self::from_raw_with(edge_ends, edge_dst, &BuildOptions::default())
    }

    pub fn from_raw_with(
        edge_ends: Vec<u64>,
        edge_dst: Vec<u64>,
        options: &BuildOptions,
    ) -> Result<Self> {
        let edge_dst: Vec<NodeId> = edge_dst.into_iter().map(NodeId).collect();
        Self::from_parts(edge_ends, edge_dst, options)
    }

    /// A graph with no nodes and no edges.
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        edge_ends: Vec<u64>,
        mut edge_dst: Vec<NodeId>,
        options: &BuildOptions,
    ) -> Result<Self> {
        validate_edge_ends(&edge_ends, edge_dst.len() as u64)?;

        let node_count = edge_ends.len() as u64;
        if options.validate_destinations {
            if let Some((edge, dst)) = edge_dst
                .iter()
                .enumerate()
                .find(|(_, dst)| dst.0 >= node_count)
            {
                return Err(Error::InvalidTopology(format!(
                    "edge {edge} points at node {dst}, but the graph has {node_count} nodes"
                )));
            }
        }

        if options.sort_by_dst {
            sort_slices(&edge_ends, &mut edge_dst);
        }
        let sorted_by_dst = slices_sorted(&edge_ends, &edge_dst);

        debug!(
            nodes = node_count,
            edges = edge_dst.len(),
            sorted_by_dst,
            "built CSR topology"
        );

        Ok(Self {
            edge_ends: edge_ends.into_boxed_slice(),
            edge_dst: edge_dst.into_boxed_slice(),
            sorted_by_dst,
        })
    }

    // ========================================================================
    // Raw access
    // ========================================================================

    /// The edge-range-end array, one entry per node.
    pub fn edge_ends(&self) -> &[u64] {
        &self.edge_ends
    }

    /// The flattened destination array, one entry per edge.
    pub fn edge_destinations(&self) -> &[NodeId] {
        &self.edge_dst
    }

    // ========================================================================
    // Edge access
    // ========================================================================

    /// Destination node of `edge`.
    pub fn edge_dst(&self, edge: EdgeId) -> Result<NodeId> {
        self.edge_dst
            .get(edge.index())
            .copied()
            .ok_or(Error::IndexOutOfRange {
                kind: "edge",
                index: edge.0,
                len: self.edge_count(),
            })
    }

    /// Number of out-edges of `node`.
    pub fn degree(&self, node: NodeId) -> Result<u64> {
        Ok(self.out_edges(node)?.len())
    }

    /// Destinations of `node`'s out-edges, in storage order.
    pub fn neighbors(&self, node: NodeId) -> Result<&[NodeId]> {
        let range = self.out_edges(node)?;
        Ok(&self.edge_dst[range.as_usize_range()])
    }

    /// First edge `src -> dst`, if any. Binary search when the edges are
    /// sorted by destination, linear scan otherwise.
    pub fn find_edge(&self, src: NodeId, dst: NodeId) -> Result<Option<EdgeId>> {
        if self.sorted_by_dst {
            return self.find_edge_sorted_by_dst(src, dst);
        }
        let range = self.out_edges(src)?;
        Ok(self.edge_dst[range.as_usize_range()]
            .iter()
            .position(|d| *d == dst)
            .map(|offset| EdgeId(range.begin() + offset as u64)))
    }

    /// Binary-search `src`'s edges for `dst`.
    ///
    /// Requires edges sorted by destination; fails with
    /// `Error::InvalidArgument` otherwise.
    pub fn find_edge_sorted_by_dst(&self, src: NodeId, dst: NodeId) -> Result<Option<EdgeId>> {
        if !self.sorted_by_dst {
            return Err(Error::InvalidArgument(
                "binary edge search requires edges sorted by destination".into(),
            ));
        }
        let range = self.out_edges(src)?;
        let slice = &self.edge_dst[range.as_usize_range()];
        let offset = slice.partition_point(|d| *d < dst);
        Ok(match slice.get(offset) {
            Some(d) if *d == dst => Some(EdgeId(range.begin() + offset as u64)),
            _ => None,
        })
    }

    /// Whether every node's out-edges are in non-decreasing destination order.
    pub fn is_sorted_by_dst(&self) -> bool {
        self.sorted_by_dst
    }

    /// A copy of this graph with every node's edges sorted by destination.
    pub fn sorted_by_dst(&self) -> CsrTopology {
        if self.sorted_by_dst {
            return self.clone();
        }
        let mut edge_dst = self.edge_dst.to_vec();
        sort_slices(&self.edge_ends, &mut edge_dst);
        debug!(nodes = self.node_count(), edges = edge_dst.len(), "sorted CSR edges by destination");
        Self {
            edge_ends: self.edge_ends.clone(),
            edge_dst: edge_dst.into_boxed_slice(),
            sorted_by_dst: true,
        }
    }

    /// Reverse every edge: node `v`'s out-edges in the result are the
    /// in-edges of `v` here, ordered by source.
    pub fn transpose(&self) -> Result<CsrTopology> {
        let node_count = self.node_count();
        let n = node_count as usize;

        // In-degree histogram, then prefix sum into ends.
        let mut edge_ends = vec![0u64; n];
        for dst in self.edge_dst.iter() {
            let slot = edge_ends.get_mut(dst.index()).ok_or_else(|| {
                Error::InvalidTopology(format!(
                    "cannot transpose: destination {dst} outside {node_count} nodes"
                ))
            })?;
            *slot += 1;
        }
        prefix_sum(&mut edge_ends)?;

        // Scatter sources; walking sources in order keeps each slice sorted.
        let mut cursor: Vec<u64> = std::iter::once(0)
            .chain(edge_ends.iter().copied())
            .take(n)
            .collect();
        let mut edge_dst = vec![NodeId(0); self.edge_dst.len()];
        for (src, range) in self.iter_out_edges() {
            for dst in &self.edge_dst[range.as_usize_range()] {
                let pos = &mut cursor[dst.index()];
                edge_dst[*pos as usize] = src;
                *pos += 1;
            }
        }

        debug!(nodes = node_count, edges = edge_dst.len(), "transposed CSR topology");

        Ok(Self {
            edge_ends: edge_ends.into_boxed_slice(),
            edge_dst: edge_dst.into_boxed_slice(),
            sorted_by_dst: true,
        })
    }

    /// Sequential `(node, out_edges)` walk that carries the previous end
    /// forward instead of looking it up.
    pub fn iter_out_edges(&self) -> OutEdges<'_> {
        OutEdges {
            ends: &self.edge_ends,
            node: 0,
            prev: 0,
        }
    }
}

impl GraphTopology for CsrTopology {
    fn node_count(&self) -> u64 {
        self.edge_ends.len() as u64
    }

    fn edge_count(&self) -> u64 {
        self.edge_dst.len() as u64
    }

    fn edge_range_end(&self, node: NodeId) -> Result<u64> {
        self.edge_ends
            .get(node.index())
            .copied()
            .ok_or(Error::IndexOutOfRange {
                kind: "node",
                index: node.0,
                len: self.node_count(),
            })
    }
}

// ============================================================================
// OutEdges iterator
// ============================================================================

/// Iterator over every node with its out-edge range.
#[derive(Debug, Clone)]
pub struct OutEdges<'a> {
    ends: &'a [u64],
    node: usize,
    prev: u64,
}

impl Iterator for OutEdges<'_> {
    type Item = (NodeId, EdgeRange);

    fn next(&mut self) -> Option<Self::Item> {
        let end = *self.ends.get(self.node)?;
        let item = (NodeId(self.node as u64), EdgeRange::new(self.prev, end));
        self.prev = end;
        self.node += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.ends.len() - self.node;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for OutEdges<'_> {}
impl FusedIterator for OutEdges<'_> {}

// ============================================================================
// Helpers
// ============================================================================

fn validate_edge_ends(edge_ends: &[u64], edge_count: u64) -> Result<()> {
    if let Some(i) = edge_ends.windows(2).position(|w| w[0] > w[1]) {
        return Err(Error::InvalidTopology(format!(
            "edge range ends must be non-decreasing: node {} ends at {} but node {} ends at {}",
            i,
            edge_ends[i],
            i + 1,
            edge_ends[i + 1]
        )));
    }
    // An empty graph has nowhere to put edges.
    let last = edge_ends.last().copied().unwrap_or(0);
    if last != edge_count {
        return Err(Error::InvalidTopology(format!(
            "last edge range end is {last} but {edge_count} destinations were supplied"
        )));
    }
    Ok(())
}

fn sort_slices(edge_ends: &[u64], edge_dst: &mut [NodeId]) {
    let mut prev = 0usize;
    for &end in edge_ends {
        let end = end as usize;
        edge_dst[prev..end].sort_unstable();
        prev = end;
    }
}

fn slices_sorted(edge_ends: &[u64], edge_dst: &[NodeId]) -> bool {
    let mut prev = 0usize;
    edge_ends.iter().all(|&end| {
        let end = end as usize;
        let sorted = edge_dst[prev..end].is_sorted();
        prev = end;
        sorted
    })
}
