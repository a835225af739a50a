//! Building a `CsrTopology` from things that are not yet CSR arrays.
//!
//! Two paths, both ending in the same validation as `CsrTopology::from_raw`:
//!
//! - `CsrTopology::from_fn`: per-node degree and destination callbacks, the
//!   shape most generators and converters naturally produce.
//! - `CsrBuilder`: an in-memory `(src, dst)` edge list, grouped by source
//!   with a counting sort. Edges of one source keep insertion order.

use tracing::debug;

use crate::model::NodeId;
use crate::{Error, Result};
use super::{BuildOptions, CsrTopology};

impl CsrTopology {
    /// Build from a degree function and a `(node, i) -> dst` function.
    ///
    /// `degree` is called once per node in order; `dst` is then called for
    /// every `i < degree(node)`, node by node.
    pub fn from_fn<D, F>(node_count: u64, mut degree: D, mut dst: F) -> Result<Self>
    where
        D: FnMut(NodeId) -> u64,
        F: FnMut(NodeId, u64) -> NodeId,
    {
        let mut edge_ends = Vec::new();
        let mut running = 0u64;
        for n in 0..node_count {
            let d = degree(NodeId(n));
            running = running.checked_add(d).ok_or_else(|| {
                Error::InvalidTopology(format!(
                    "edge count overflows u64 at node {n} (degree {d})"
                ))
            })?;
            edge_ends.push(running);
        }

        let mut edge_dst = Vec::new();
        usize::try_from(running)
            .ok()
            .and_then(|m| edge_dst.try_reserve_exact(m).ok())
            .ok_or_else(|| {
                Error::InvalidTopology(format!("cannot allocate {running} edges"))
            })?;
        let mut prev = 0u64;
        for (n, &end) in edge_ends.iter().enumerate() {
            let node = NodeId(n as u64);
            for i in 0..end - prev {
                edge_dst.push(dst(node, i));
            }
            prev = end;
        }

        Self::from_parts(edge_ends, edge_dst, &BuildOptions::default())
    }
}

/// Accumulates an edge list and builds a `CsrTopology` from it.
///
/// ```rust
/// use csr_graph::{CsrBuilder, GraphTopology, NodeId};
///
/// # fn example() -> csr_graph::Result<()> {
/// let graph = CsrBuilder::new(3)
///     .edge(NodeId(0), NodeId(1))
///     .edge(NodeId(2), NodeId(0))
///     .build()?;
/// assert_eq!(graph.edge_count(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CsrBuilder {
    node_count: u64,
    edges: Vec<(NodeId, NodeId)>,
    options: BuildOptions,
}

impl CsrBuilder {
    pub fn new(node_count: u64) -> Self {
        Self {
            node_count,
            edges: Vec::new(),
            options: BuildOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Add one directed edge (chaining form).
    pub fn edge(mut self, src: NodeId, dst: NodeId) -> Self {
        self.edges.push((src, dst));
        self
    }

    pub fn add_edge(&mut self, src: NodeId, dst: NodeId) -> &mut Self {
        self.edges.push((src, dst));
        self
    }

    pub fn extend<I>(&mut self, edges: I) -> &mut Self
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
    {
        self.edges.extend(edges);
        self
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Group edges by source and validate.
    ///
    /// Fails with `Error::InvalidTopology` if any source is outside
    /// `0..node_count` (and any destination, unless destination validation
    /// is disabled).
    pub fn build(self) -> Result<CsrTopology> {
        let n = usize::try_from(self.node_count).map_err(|_| {
            Error::InvalidArgument(format!(
                "{} nodes do not fit in memory on this target",
                self.node_count
            ))
        })?;

        let mut edge_ends = vec![0u64; n];
        for (src, dst) in &self.edges {
            let slot = edge_ends.get_mut(src.index()).ok_or_else(|| {
                Error::InvalidTopology(format!(
                    "edge {src} -> {dst} starts outside {} nodes",
                    self.node_count
                ))
            })?;
            *slot += 1;
        }
        prefix_sum(&mut edge_ends)?;

        let mut cursor: Vec<u64> = std::iter::once(0)
            .chain(edge_ends.iter().copied())
            .take(n)
            .collect();
        let mut edge_dst = vec![NodeId(0); self.edges.len()];
        for (src, dst) in &self.edges {
            let pos = &mut cursor[src.index()];
            edge_dst[*pos as usize] = *dst;
            *pos += 1;
        }

        debug!(nodes = self.node_count, edges = self.edges.len(), "grouped edge list into CSR");

        CsrTopology::from_parts(edge_ends, edge_dst, &self.options)
    }
}

/// Turn per-node counts into running ends, in place.
pub(crate) fn prefix_sum(counts: &mut [u64]) -> Result<()> {
    let mut running = 0u64;
    for (node, end) in counts.iter_mut().enumerate() {
        running = running.checked_add(*end).ok_or_else(|| {
            Error::InvalidTopology(format!("edge count overflows u64 at node {node}"))
        })?;
        *end = running;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EdgeRange;
    use crate::storage::GraphTopology;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_fn_prefix_sums_degrees() {
        // Node n points at every node below it.
        let g = CsrTopology::from_fn(4, |n| n.0, |_, i| NodeId(i)).unwrap();
        assert_eq!(g.edge_ends(), &[0, 1, 3, 6]);
        assert_eq!(g.edge_count(), 6);
        assert_eq!(g.neighbors(NodeId(3)).unwrap(), &[NodeId(0), NodeId(1), NodeId(2)]);
    }

    #[test]
    fn test_from_fn_validates_destinations() {
        let err = CsrTopology::from_fn(2, |_| 1, |_, _| NodeId(7)).unwrap_err();
        assert!(matches!(err, Error::InvalidTopology(_)));
    }

    #[test]
    fn test_from_fn_degree_overflow_is_an_error() {
        let err = CsrTopology::from_fn(2, |_| u64::MAX, |_, _| NodeId(0)).unwrap_err();
        assert!(matches!(err, Error::InvalidTopology(ref msg) if msg.contains("overflows")));
    }

    #[test]
    fn test_from_fn_unallocatable_edge_count_is_an_error() {
        let err = CsrTopology::from_fn(1, |_| u64::MAX, |_, _| NodeId(0)).unwrap_err();
        assert!(matches!(err, Error::InvalidTopology(_)));
    }

    #[test]
    fn test_prefix_sum() {
        let mut counts = [2, 0, 3, 1];
        prefix_sum(&mut counts).unwrap();
        assert_eq!(counts, [2, 2, 5, 6]);

        let mut huge = [u64::MAX, 1];
        assert!(matches!(prefix_sum(&mut huge), Err(Error::InvalidTopology(_))));
    }

    #[test]
    fn test_builder_groups_by_source_stably() {
        let mut b = CsrBuilder::new(3);
        b.add_edge(NodeId(2), NodeId(0))
            .add_edge(NodeId(0), NodeId(2))
            .add_edge(NodeId(2), NodeId(1))
            .add_edge(NodeId(0), NodeId(1));
        assert_eq!(b.edge_count(), 4);

        let g = b.build().unwrap();
        assert_eq!(g.edge_ends(), &[2, 2, 4]);
        assert_eq!(g.neighbors(NodeId(0)).unwrap(), &[NodeId(2), NodeId(1)]);
        assert_eq!(g.neighbors(NodeId(2)).unwrap(), &[NodeId(0), NodeId(1)]);
        assert_eq!(g.out_edges(NodeId(1)).unwrap(), EdgeRange::new(2, 2));
    }

    #[test]
    fn test_builder_sorts_when_asked() {
        let opts = BuildOptions {
            sort_by_dst: true,
            ..BuildOptions::default()
        };
        let g = CsrBuilder::new(3)
            .with_options(opts)
            .edge(NodeId(0), NodeId(2))
            .edge(NodeId(0), NodeId(1))
            .build()
            .unwrap();
        assert!(g.is_sorted_by_dst());
        assert_eq!(g.neighbors(NodeId(0)).unwrap(), &[NodeId(1), NodeId(2)]);
    }

    #[test]
    fn test_builder_rejects_unknown_nodes() {
        let bad_src = CsrBuilder::new(2).edge(NodeId(2), NodeId(0)).build();
        assert!(matches!(bad_src, Err(Error::InvalidTopology(_))));

        let bad_dst = CsrBuilder::new(2).edge(NodeId(0), NodeId(9)).build();
        assert!(matches!(bad_dst, Err(Error::InvalidTopology(_))));
    }

    #[test]
    fn test_builder_without_edges() {
        let g = CsrBuilder::new(5).build().unwrap();
        assert_eq!(g.node_count(), 5);
        assert_eq!(g.edge_count(), 0);
        assert!(g.nodes().all(|n| g.out_edges(n).unwrap().is_empty()));
    }
}
