/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */
//! Property-based tests for the universally-quantified invariants of
//! spec.md S8: edge symmetry, add_edge idempotence, complement
//! involution, and clique-disjointness symmetry under argument swap.
extern crate cds_lns_core;
extern crate proptest;

use cds_lns_core::{canonical_edge, LiteralId, TransactionGraph};
use proptest::prelude::*;

const N_CONCRETE: i64 = 6;

fn literal_strategy() -> impl Strategy<Value = LiteralId> {
    (1..=N_CONCRETE)
        .prop_flat_map(|v| prop_oneof![Just(v), Just(-v)])
        .prop_map(LiteralId::new)
}

fn conflicts_strategy() -> impl Strategy<Value = Vec<(LiteralId, LiteralId)>> {
    proptest::collection::vec((literal_strategy(), literal_strategy()), 0..12)
        .prop_map(|pairs| {
            pairs
                .into_iter()
                .filter(|&(a, b)| a != b)
                .map(|(a, b)| canonical_edge(a, b))
                .collect()
        })
}

proptest! {
    #[test]
    fn edge_queries_are_symmetric(conflicts in conflicts_strategy(), a in literal_strategy(), b in literal_strategy()) {
        prop_assume!(a != b);
        let g = TransactionGraph::from_conflicts(N_CONCRETE, &conflicts).unwrap();
        prop_assert_eq!(g.has_edge(a, b).unwrap(), g.has_edge(b, a).unwrap());
    }

    #[test]
    fn add_edge_is_idempotent(conflicts in conflicts_strategy(), a in literal_strategy(), b in literal_strategy()) {
        prop_assume!(a != b);
        let mut g = TransactionGraph::from_conflicts(N_CONCRETE, &conflicts).unwrap();
        let first = g.add_edge(a, b).unwrap();
        let second = g.add_edge(a, b).unwrap();
        prop_assert!(!second);
        if first {
            prop_assert!(g.has_edge(a, b).unwrap());
        }
    }

    #[test]
    fn complement_applied_twice_is_identity(conflicts in conflicts_strategy()) {
        let g = TransactionGraph::from_conflicts(N_CONCRETE, &conflicts).unwrap();
        let g2 = g.complement().complement();
        prop_assert_eq!(g.n_edges(), g2.n_edges());
        for &(a, b) in &g.all_edges() {
            prop_assert_eq!(g.has_edge(a, b).unwrap(), g2.has_edge(a, b).unwrap());
        }
    }

    #[test]
    fn num_edges_equals_popcount_of_all_edges(conflicts in conflicts_strategy()) {
        let g = TransactionGraph::from_conflicts(N_CONCRETE, &conflicts).unwrap();
        prop_assert_eq!(g.n_edges(), g.all_edges().len());
    }

    #[test]
    fn clique_disjoint_is_symmetric_under_swap(
        conflicts in conflicts_strategy(),
        e1 in (literal_strategy(), literal_strategy()),
        e2 in (literal_strategy(), literal_strategy()),
    ) {
        prop_assume!(e1.0 != e1.1);
        prop_assume!(e2.0 != e2.1);
        let g = TransactionGraph::from_conflicts(N_CONCRETE, &conflicts).unwrap();
        let e1 = canonical_edge(e1.0, e1.1);
        let e2 = canonical_edge(e2.0, e2.1);
        prop_assert_eq!(g.clique_disjoint(e1, e2).unwrap(), g.clique_disjoint(e2, e1).unwrap());
    }

    #[test]
    fn conflicts_reproduce_as_non_edges(conflicts in conflicts_strategy()) {
        let g = TransactionGraph::from_conflicts(N_CONCRETE, &conflicts).unwrap();
        let conflict_set: std::collections::BTreeSet<_> = conflicts.into_iter().collect();
        for &(a, b) in &conflict_set {
            prop_assert!(!g.has_edge(a, b).unwrap());
        }
    }
}
