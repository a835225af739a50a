//! Property tests for the CSR invariants over random valid graphs.

use csr_graph::{
    CsrBuilder, CsrTopology, Error, GraphTopology, NodeId, divide_by_node,
};
use proptest::prelude::*;

/// Random graph as per-node degree list plus destinations.
fn arb_graph() -> impl Strategy<Value = CsrTopology> {
    (1u64..40)
        .prop_flat_map(|n| {
            let degrees = prop::collection::vec(0u64..6, n as usize);
            (Just(n), degrees)
        })
        .prop_flat_map(|(n, degrees)| {
            let m: u64 = degrees.iter().sum();
            let dsts = prop::collection::vec(0..n, m as usize);
            (Just(degrees), dsts)
        })
        .prop_map(|(degrees, dsts)| {
            let mut ends = Vec::with_capacity(degrees.len());
            let mut running = 0;
            for d in degrees {
                running += d;
                ends.push(running);
            }
            CsrTopology::from_raw(ends, dsts).unwrap()
        })
}

proptest! {
    #[test]
    fn out_edges_are_well_formed(g in arb_graph()) {
        prop_assert_eq!(g.out_edges(NodeId(0)).unwrap().begin(), 0);
        for n in g.nodes() {
            let r = g.out_edges(n).unwrap();
            prop_assert!(r.begin() <= r.end());
            prop_assert_eq!(r.end(), g.edge_range_end(n).unwrap());
        }
    }

    #[test]
    fn ranges_sum_to_edge_count(g in arb_graph()) {
        let total: u64 = g.nodes().map(|n| g.out_edges(n).unwrap().len()).sum();
        prop_assert_eq!(total, g.edge_count());
        prop_assert_eq!(g.edge_range_end(NodeId(g.node_count() - 1)).unwrap(), g.edge_count());
    }

    #[test]
    fn len_and_nodes_agree(g in arb_graph()) {
        prop_assert_eq!(g.len(), g.node_count());
        let nodes: Vec<u64> = g.nodes().map(|n| n.0).collect();
        prop_assert_eq!(nodes.len() as u64, g.node_count());
        prop_assert!(nodes.iter().enumerate().all(|(i, n)| *n == i as u64));
        let again: Vec<u64> = g.nodes().map(|n| n.0).collect();
        prop_assert_eq!(nodes, again);
    }

    #[test]
    fn past_the_end_is_out_of_range(g in arb_graph(), extra in 0u64..1000) {
        let bad = NodeId(g.node_count() + extra);
        let is_out_of_range = matches!(
            g.edge_range_end(bad),
            Err(Error::IndexOutOfRange { .. })
        );
        prop_assert!(is_out_of_range);
    }

    #[test]
    fn transpose_twice_is_sorted_original(g in arb_graph()) {
        let back = g.transpose().unwrap().transpose().unwrap();
        prop_assert_eq!(back, g.sorted_by_dst());
    }

    #[test]
    fn builder_agrees_with_raw_arrays(g in arb_graph()) {
        let mut b = CsrBuilder::new(g.node_count());
        for (src, range) in g.iter_out_edges() {
            for e in range {
                b.add_edge(src, g.edge_dst(e).unwrap());
            }
        }
        prop_assert_eq!(b.build().unwrap(), g);
    }

    #[test]
    fn partitions_tile_the_nodes(g in arb_graph(), parts in 1usize..9, weight in 0u64..4) {
        let ranges = divide_by_node(&g, parts, weight).unwrap();
        prop_assert_eq!(ranges.len(), parts);
        prop_assert_eq!(ranges[0].start, 0);
        prop_assert_eq!(ranges[parts - 1].end, g.node_count());
        for pair in ranges.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
        }
    }
}
