/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */
use crate::cds::error::{CdsError, CdsResult};
use crate::cds::literal::Edge;
use crate::cds::neighborhood::Neighborhood;
use crate::cds::solution::Cds;
use crate::cds::solution_pool::{SolutionPool, SOLUTION_POOL_SIZE};
use crate::cds::transaction_graph::TransactionGraph;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Consecutive non-improving iterations before the selector abandons
/// `best_solution` as a seed and diversifies from the pool instead.
pub const STAGNATION_THRESHOLD: u32 = 5;
/// `max_free_edges` never shrinks below this.
pub const FREE_EDGES_LOW_CAP: usize = 250;
const INITIAL_MAX_FREE_EDGES: usize = 1000;

/// Adaptive neighborhood construction for `CdsSolver` (spec.md §4.7):
/// picks the fixed/free edge partition each iteration, adjusts
/// `max_free_edges` based on how much of the iteration budget was
/// used, and escapes stagnation by reseeding from a pool of past
/// solutions.
pub struct CdsNeighborhoodSelector {
    best_solution: Vec<Edge>,
    solution_pool: SolutionPool,
    max_free_edges: usize,
    edges_to_add_seq: usize,
    stagnation_counter: u32,
    subgraph: Vec<Edge>,
    verbose: bool,
}

impl CdsNeighborhoodSelector {
    /// `subgraph` empty means "no restriction — free edges are drawn
    /// from all of `G`". Validates that every subgraph edge exists in
    /// `graph`, and that `initial` lies within the subgraph when one
    /// is active.
    pub fn new(
        graph: &TransactionGraph,
        initial: Vec<Edge>,
        subgraph: Vec<Edge>,
        verbose: bool,
    ) -> CdsResult<Self> {
        for &(a, b) in &subgraph {
            if !graph.has_edge(a, b)? {
                return Err(CdsError::InvalidSubgraph((a.value(), b.value())));
            }
        }
        if !subgraph.is_empty() {
            let allowed: HashSet<Edge> = subgraph.iter().copied().collect();
            for &e in &initial {
                if !allowed.contains(&e) {
                    return Err(CdsError::InitialSolutionOutsideSubgraph((
                        e.0.value(),
                        e.1.value(),
                    )));
                }
            }
        }
        Ok(Self {
            best_solution: initial,
            solution_pool: SolutionPool::new(SOLUTION_POOL_SIZE),
            max_free_edges: INITIAL_MAX_FREE_EDGES,
            edges_to_add_seq: 1,
            stagnation_counter: 0,
            subgraph,
            verbose,
        })
    }

    fn universe_size(&self, graph: &TransactionGraph) -> usize {
        if self.subgraph.is_empty() {
            graph.n_edges()
        } else {
            self.subgraph.len()
        }
    }

    pub fn max_free_edges(&self) -> usize {
        self.max_free_edges
    }

    pub fn edges_to_add_seq(&self) -> usize {
        self.edges_to_add_seq
    }

    /// Selects the next `(fixed, free)` neighborhood.
    pub fn next(&mut self, graph: &TransactionGraph, rng: &mut impl Rng) -> CdsResult<Neighborhood> {
        if self.max_free_edges >= self.universe_size(graph) {
            let free = if self.subgraph.is_empty() {
                graph.all_edges()
            } else {
                self.subgraph.clone()
            };
            return Ok(Neighborhood::new(Vec::new(), free));
        }

        let mut init = if self.stagnation_counter < STAGNATION_THRESHOLD {
            self.best_solution.clone()
        } else {
            if self.verbose {
                eprintln!("cds_neighborhood_selector: stagnation escape, reseeding from pool");
            }
            self.solution_pool
                .random_entry(rng)
                .map(|c| c.edges.clone())
                .unwrap_or_else(|| self.best_solution.clone())
        };
        init.shuffle(rng);

        let mut fixed: Vec<Edge> = Vec::new();
        let mut remaining: Vec<Edge> = if self.subgraph.is_empty() {
            if let Some(e) = init.pop() {
                fixed.push(e);
            }
            graph.edges_where(|cand| {
                fixed
                    .iter()
                    .all(|&f| graph.clique_disjoint(cand, f).unwrap_or(false))
            })
        } else {
            self.subgraph.clone()
        };

        loop {
            if remaining.len() <= self.max_free_edges || init.is_empty() {
                break;
            }
            let remaining_prev = remaining.clone();
            let fixed_len_before = fixed.len();
            let mut popped = Vec::new();
            for _ in 0..self.edges_to_add_seq {
                match init.pop() {
                    Some(e) => popped.push(e),
                    None => break,
                }
            }
            fixed.extend(popped.iter().copied());
            remaining.retain(|&cand| {
                popped
                    .iter()
                    .all(|&f| graph.clique_disjoint(cand, f).unwrap_or(false))
            });
            if remaining.is_empty() {
                fixed.truncate(fixed_len_before);
                for e in popped.into_iter().rev() {
                    init.push(e);
                }
                remaining = remaining_prev;
                break;
            }
        }

        if remaining.len() > self.max_free_edges {
            let init_set: HashSet<Edge> = init.iter().copied().collect();
            let before = remaining.len();
            remaining.retain(|e| !init_set.contains(e));
            let removed = before - remaining.len();
            if removed != init.len() {
                return Err(CdsError::InternalInvariantBroken(
                    "neighborhood trim removed a different count of seed edges than expected"
                        .to_string(),
                ));
            }
            remaining.shuffle(rng);
            let keep = self.max_free_edges.saturating_sub(init.len());
            remaining.truncate(keep);
            remaining.extend(init.iter().copied());
        }

        self.stagnation_counter += 1;
        Ok(Neighborhood::new(fixed, remaining))
    }

    /// Adaptive sizing after the engine has run one iteration on the
    /// neighborhood this selector emitted.
    pub fn feedback(&mut self, sol: &[Edge], t_util: f64, nb_util: f64) {
        self.solution_pool.insert(Cds::new(sol.to_vec()));
        if t_util < 0.5 {
            self.max_free_edges = ((self.max_free_edges as f64) * 1.1).floor() as usize;
        } else if t_util > 0.95 {
            let shrunk = ((self.max_free_edges as f64) * 0.9).floor() as usize;
            self.max_free_edges = shrunk.max(FREE_EDGES_LOW_CAP);
        }
        if t_util >= 0.1 && nb_util >= 0.5 {
            self.edges_to_add_seq += 1;
        }
    }

    pub fn better_solution_callback(&mut self, sol: &[Edge]) {
        self.edges_to_add_seq = self.edges_to_add_seq.max(sol.len() / 100);
        self.best_solution = sol.to_vec();
        self.stagnation_counter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cds::literal::{canonical_edge, LiteralId};
    use rand::SeedableRng;

    fn lit(v: i64) -> LiteralId {
        LiteralId::new(v)
    }

    #[test]
    fn short_circuits_when_universe_fits_budget() {
        let g = TransactionGraph::from_conflicts(2, &[]).unwrap();
        let mut sel = CdsNeighborhoodSelector::new(&g, Vec::new(), Vec::new(), false).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let nb = sel.next(&g, &mut rng).unwrap();
        assert!(nb.fixed.is_empty());
        assert_eq!(nb.free.len(), g.n_edges());
    }

    #[test]
    fn rejects_subgraph_edge_not_in_graph() {
        let g = TransactionGraph::from_conflicts(2, &[(lit(1), lit(2))]).unwrap();
        let bad_subgraph = vec![canonical_edge(lit(1), lit(2))];
        let err = CdsNeighborhoodSelector::new(&g, Vec::new(), bad_subgraph, false).unwrap_err();
        assert!(matches!(err, CdsError::InvalidSubgraph(_)));
    }

    #[test]
    fn rejects_initial_outside_subgraph() {
        let g = TransactionGraph::from_conflicts(3, &[]).unwrap();
        let subgraph = vec![canonical_edge(lit(1), lit(2))];
        let initial = vec![canonical_edge(lit(1), lit(3))];
        let err =
            CdsNeighborhoodSelector::new(&g, initial, subgraph, false).unwrap_err();
        assert!(matches!(err, CdsError::InitialSolutionOutsideSubgraph(_)));
    }

    #[test]
    fn better_solution_callback_resets_stagnation() {
        let g = TransactionGraph::from_conflicts(2, &[]).unwrap();
        let mut sel = CdsNeighborhoodSelector::new(&g, Vec::new(), Vec::new(), false).unwrap();
        sel.stagnation_counter = 4;
        sel.better_solution_callback(&[canonical_edge(lit(1), lit(2))]);
        assert_eq!(sel.stagnation_counter, 0);
        assert_eq!(sel.best_solution.len(), 1);
    }

    #[test]
    fn feedback_grows_budget_on_low_utilization() {
        let g = TransactionGraph::from_conflicts(2, &[]).unwrap();
        let mut sel = CdsNeighborhoodSelector::new(&g, Vec::new(), Vec::new(), false).unwrap();
        let before = sel.max_free_edges();
        sel.feedback(&[], 0.1, 0.1);
        assert!(sel.max_free_edges() > before);
    }
}
