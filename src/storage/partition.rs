//! Work partitioning: split the node space into balanced contiguous ranges.
//!
//! Each range gets roughly the same `node_weight * nodes + edges` load.
//! The edge-range-end array is already a prefix sum of edges, so every
//! split point is one binary search away.

use std::ops::Range;

use smallvec::SmallVec;

use crate::model::{EdgeRange, NodeId};
use crate::{Error, Result};
use super::GraphTopology;

/// Contiguous node ranges, one per part.
pub type NodeRanges = SmallVec<[Range<u64>; 8]>;

/// Per-part node range together with the edges those nodes own.
pub type WorkRanges = SmallVec<[(Range<u64>, EdgeRange); 8]>;

/// Divide `0..node_count` into exactly `parts` contiguous ranges of
/// balanced weight. Ranges tile the node space in order; trailing ranges may
/// be empty when there is less work than parts.
///
/// `node_weight` is how many edges one node counts as. Zero balances purely
/// on edges.
pub fn divide_by_node<G>(graph: &G, parts: usize, node_weight: u64) -> Result<NodeRanges>
where
    G: GraphTopology + ?Sized,
{
    let ranges = divide_range(graph, 0..graph.node_count(), parts, node_weight)?;
    Ok(ranges.into_iter().map(|(nodes, _)| nodes).collect())
}

/// Divide the sub-range `nodes` into exactly `parts` balanced pieces, each
/// paired with the edge range its nodes own.
///
/// Fails with `Error::InvalidArgument` if `parts == 0` or `nodes` is
/// inverted or reaches past `node_count`.
pub fn divide_range<G>(
    graph: &G,
    nodes: Range<u64>,
    parts: usize,
    node_weight: u64,
) -> Result<WorkRanges>
where
    G: GraphTopology + ?Sized,
{
    if parts == 0 {
        return Err(Error::InvalidArgument(
            "cannot divide a graph into zero parts".into(),
        ));
    }
    let n = graph.node_count();
    if nodes.start > nodes.end || nodes.end > n {
        return Err(Error::InvalidArgument(format!(
            "node range {}..{} is not within 0..{n}",
            nodes.start, nodes.end
        )));
    }

    let base = prefix_weight(graph, nodes.start, node_weight)?;
    let total = prefix_weight(graph, nodes.end, node_weight)?
        .checked_sub(base)
        .ok_or_else(|| Error::InvalidTopology("edge range ends decrease".into()))?;

    let mut ranges = WorkRanges::with_capacity(parts);
    let mut begin = nodes.start;
    let mut begin_edge = prefix_edges(graph, begin)?;
    for part in 1..=parts {
        let end = if part == parts {
            nodes.end
        } else {
            let target = base + (total * part as u128).div_ceil(parts as u128);
            lower_bound(graph, begin, nodes.end, node_weight, target)?
        };
        let end_edge = prefix_edges(graph, end)?;
        ranges.push((begin..end, EdgeRange::try_new(begin_edge, end_edge)?));
        begin = end;
        begin_edge = end_edge;
    }
    Ok(ranges)
}

/// Edges owned by the first `k` nodes.
fn prefix_edges<G>(graph: &G, k: u64) -> Result<u64>
where
    G: GraphTopology + ?Sized,
{
    match k {
        0 => Ok(0),
        k => graph.edge_range_end(NodeId(k - 1)),
    }
}

/// Weight of the first `k` nodes and their edges.
fn prefix_weight<G>(graph: &G, k: u64, node_weight: u64) -> Result<u128>
where
    G: GraphTopology + ?Sized,
{
    let edges = prefix_edges(graph, k)?;
    Ok(node_weight as u128 * k as u128 + edges as u128)
}

/// Smallest `k` in `lo..=hi` whose prefix weight reaches `target`.
fn lower_bound<G>(graph: &G, mut lo: u64, mut hi: u64, node_weight: u64, target: u128) -> Result<u64>
where
    G: GraphTopology + ?Sized,
{
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if prefix_weight(graph, mid, node_weight)? < target {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    Ok(lo)
}
