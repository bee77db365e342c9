/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */
use crate::cds::counter_matrix::CounterMatrix;
use crate::cds::error::{CdsError, CdsResult};
use crate::cds::literal::Edge;
use crate::cds::transaction_graph::TransactionGraph;
use rand::seq::SliceRandom;
use rand::Rng;

/// Produces a CDS by scanning edges in ascending cover-count order (or
/// in random order, if no covering sample is available), greedily
/// keeping any edge that stays clique-disjoint with the accumulator.
pub struct GreedyCds {
    counts: Option<CounterMatrix>,
}

impl GreedyCds {
    pub fn new() -> Self {
        Self { counts: None }
    }

    /// Seeds the scan order with covering counts from a sample of
    /// feature configurations (spec.md §4.3/§4.5).
    pub fn with_sample(n_concrete: i64, sample: &[Vec<crate::cds::literal::LiteralId>]) -> CdsResult<Self> {
        Ok(Self {
            counts: Some(CounterMatrix::from_sample(n_concrete, sample)?),
        })
    }

    /// `subgraph`, if nonempty, is the candidate pool; otherwise the
    /// pool is every edge of `graph`.
    pub fn optimize(
        &self,
        graph: &TransactionGraph,
        subgraph: &[Edge],
        rng: &mut impl Rng,
    ) -> CdsResult<Vec<Edge>> {
        let mut pool: Vec<Edge> = if subgraph.is_empty() {
            graph.all_edges()
        } else {
            subgraph.to_vec()
        };
        pool.shuffle(rng);
        if let Some(counts) = &self.counts {
            pool.sort_by_key(|&e| counts.get_edge(e).unwrap_or(0));
        }

        let mut accumulator: Vec<Edge> = Vec::new();
        for e in pool {
            let mut disjoint_with_all = true;
            for &f in &accumulator {
                if !graph.clique_disjoint(e, f)? {
                    disjoint_with_all = false;
                    break;
                }
            }
            if disjoint_with_all {
                accumulator.push(e);
            }
        }

        if !graph.is_clique_disjoint_set(&accumulator)? {
            return Err(CdsError::InternalInvariantBroken(
                "greedy CDS construction produced a non-clique-disjoint set".to_string(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for &e in &accumulator {
            if !seen.insert(e) {
                return Err(CdsError::InternalInvariantBroken(
                    "greedy CDS construction produced a duplicate edge".to_string(),
                ));
            }
        }
        Ok(accumulator)
    }
}

impl Default for GreedyCds {
    fn default() -> Self {
        Self::new()
    }
}
