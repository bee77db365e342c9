/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */
use crate::cds::cds_ip_subsolver::CdsIpSubsolver;
use crate::cds::cds_neighborhood_selector::CdsNeighborhoodSelector;
use crate::cds::error::CdsResult;
use crate::cds::ip_oracle::{BranchAndBoundOracle, MaxIndependentSetOracle, OracleStatus};
use crate::cds::literal::{canonical_edge, Edge, LiteralId};
use crate::cds::lns_engine::{LnsCapability, LnsEngine};
use crate::cds::mis_heuristic_cds::MisHeuristicCds;
use crate::cds::neighborhood::Neighborhood;
use crate::cds::rng::new_rng;
use crate::cds::stats::{
    IterationStats, FOUND_SOLUTION_SIZE, GLOBAL_LB, GRB_STATUS, PROVEN_OPTIMAL,
};
use crate::cds::transaction_graph::TransactionGraph;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Mutex;
use std::time::Duration;

/// Glues `CdsNeighborhoodSelector` (C8) and `CdsIpSubsolver` (C7) into
/// the capability record `LnsEngine` needs (spec.md §4.8).
pub struct CdsSolver<O: MaxIndependentSetOracle = BranchAndBoundOracle> {
    ip_solver: CdsIpSubsolver<O>,
    proven_optimal: bool,
}

impl Default for CdsSolver<BranchAndBoundOracle> {
    fn default() -> Self {
        Self {
            ip_solver: CdsIpSubsolver::default(),
            proven_optimal: false,
        }
    }
}

impl<O: MaxIndependentSetOracle> CdsSolver<O> {
    pub fn with_oracle(ip_solver: CdsIpSubsolver<O>) -> Self {
        Self {
            ip_solver,
            proven_optimal: false,
        }
    }
}

impl<O: MaxIndependentSetOracle> LnsCapability for CdsSolver<O> {
    fn score(&self, sol: &[Edge]) -> i64 {
        sol.len() as i64
    }

    fn optimize_neighborhood(
        &mut self,
        graph: &TransactionGraph,
        nbhd: &Neighborhood,
        timeout: Duration,
        current_best_score: i64,
        stats: &mut IterationStats,
    ) -> CdsResult<Vec<Edge>> {
        // `CdsIpSubsolver::solve` already re-validates clique-disjointness
        // internally (InternalInvariantBroken on failure), so the check
        // spec.md §4.8 asks for here is already enforced; no need to
        // repeat the O(m^2) scan.
        let (ip_sol, status) = self.ip_solver.solve(graph, &nbhd.free, timeout, &[])?;
        stats.set(GRB_STATUS, status.as_code());

        if ip_sol.is_empty() && !nbhd.free.is_empty() {
            stats.set(PROVEN_OPTIMAL, self.proven_optimal as i64);
            stats.set(FOUND_SOLUTION_SIZE, nbhd.fixed.len() as i64);
            stats.set(
                GLOBAL_LB,
                (nbhd.fixed.len() as i64).max(current_best_score),
            );
            return Ok(nbhd.fixed.clone());
        }

        if nbhd.fixed.is_empty() && status == OracleStatus::Optimal {
            self.proven_optimal = true;
        }

        let mut combined = ip_sol;
        combined.extend(nbhd.fixed.iter().copied());
        stats.set(PROVEN_OPTIMAL, self.proven_optimal as i64);
        stats.set(FOUND_SOLUTION_SIZE, combined.len() as i64);
        stats.set(GLOBAL_LB, (combined.len() as i64).max(current_best_score));
        Ok(combined)
    }

    fn is_optimal(&self) -> bool {
        self.proven_optimal
    }

    fn new_solution_callback(&mut self, _sol: &[Edge]) {}
}

struct SolverState {
    engine: Option<LnsEngine<CdsSolver>>,
    rng: StdRng,
    pending_callbacks: Vec<Box<dyn FnMut(&[Edge]) + Send>>,
}

/// Top-level synchronous facade (spec.md §4.9): owns the graph, an
/// optional restricting subgraph, and the `LnsEngine` that accumulates
/// best-known state across repeated `optimize()` calls.
pub struct CDSSolverInterface {
    graph: TransactionGraph,
    subgraph: Vec<Edge>,
    use_heur: bool,
    // Reserved for interface parity with the embedding surface; not
    // load-bearing in the core LNS loop (see DESIGN.md).
    #[allow(dead_code)]
    be_smart: bool,
    state: Mutex<SolverState>,
}

impl CDSSolverInterface {
    pub fn new(graph: TransactionGraph, subgraph: Vec<Edge>, use_heur: bool, be_smart: bool) -> Self {
        Self {
            graph,
            subgraph,
            use_heur,
            be_smart,
            state: Mutex::new(SolverState {
                engine: None,
                rng: new_rng(),
                pending_callbacks: Vec::new(),
            }),
        }
    }

    /// Registers a "better-solution" callback. If the engine already
    /// exists it is wired immediately; otherwise it is queued and wired
    /// the first time `optimize()` builds the engine. Used by
    /// `AsyncDriver` to publish snapshots.
    pub fn register_callback(&self, cb: Box<dyn FnMut(&[Edge]) + Send>) {
        let mut state = self.state.lock().unwrap();
        match state.engine.as_mut() {
            Some(engine) => engine.add_callback(cb),
            None => state.pending_callbacks.push(cb),
        }
    }

    pub fn graph(&self) -> &TransactionGraph {
        &self.graph
    }

    /// Scans concrete features in order, picking the first whose
    /// neighbor list is nonempty, and fixes one arbitrary neighbor —
    /// the fallback bootstrap when the heuristic path isn't taken.
    fn fix_single_edge(&self, rng: &mut impl Rng) -> CdsResult<Vec<Edge>> {
        for v in 1..=self.graph.n_concrete() {
            let lit = LiteralId::new(v);
            let mut neighbors = self.graph.neighbors(lit)?;
            if !neighbors.is_empty() {
                neighbors.shuffle(rng);
                return Ok(vec![canonical_edge(lit, neighbors[0])]);
            }
        }
        Ok(Vec::new())
    }

    pub fn optimize(
        &self,
        initial: Vec<Edge>,
        max_iterations: usize,
        time_limit: f64,
        verbose: bool,
    ) -> CdsResult<Vec<Edge>> {
        if self.graph.n_edges() == 0 {
            return Ok(Vec::new());
        }

        let mut state = self.state.lock().unwrap();

        if !initial.is_empty() {
            self.graph.validate_cds(&initial)?;
        }

        let engine_has_solution = state
            .engine
            .as_ref()
            .map(|e| !e.best_solution().is_empty())
            .unwrap_or(false);

        let mut seed = initial;
        if !engine_has_solution && seed.is_empty() {
            seed = if self.use_heur && self.subgraph.is_empty() {
                let mut heuristic = MisHeuristicCds::new();
                heuristic.run(
                    &self.graph,
                    Vec::new(),
                    3,
                    Duration::from_secs_f64(10.0),
                    &mut state.rng,
                )?
            } else {
                self.fix_single_edge(&mut state.rng)?
            };
        }
        let seed: Vec<Edge> = seed
            .into_iter()
            .map(|(a, b)| canonical_edge(a, b))
            .collect();

        if state.engine.is_none() {
            let selector = CdsNeighborhoodSelector::new(
                &self.graph,
                seed.clone(),
                self.subgraph.clone(),
                verbose,
            )?;
            let mut engine = LnsEngine::new(CdsSolver::default(), selector);
            for cb in std::mem::take(&mut state.pending_callbacks) {
                engine.add_callback(cb);
            }
            state.engine = Some(engine);
        }

        let engine = state.engine.as_mut().unwrap();
        engine.add_solution(seed);
        engine.run(
            &self.graph,
            max_iterations,
            Duration::from_secs_f64(time_limit),
            &mut state.rng,
        )?;
        Ok(engine.best_solution().to_vec())
    }

    pub fn iteration_statistics(&self) -> Vec<IterationStats> {
        self.state
            .lock()
            .unwrap()
            .engine
            .as_ref()
            .map(|e| e.iteration_statistics().to_vec())
            .unwrap_or_default()
    }

    pub fn has_optimal_solution(&self) -> bool {
        self.state
            .lock()
            .unwrap()
            .engine
            .as_ref()
            .map(|e| e.is_optimal())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(v: i64) -> LiteralId {
        LiteralId::new(v)
    }

    #[test]
    fn empty_graph_optimizes_to_empty() {
        let g = TransactionGraph::from_conflicts(0, &[]).unwrap();
        let solver = CDSSolverInterface::new(g, Vec::new(), false, true);
        let sol = solver.optimize(Vec::new(), 3, 1.0, false).unwrap();
        assert!(sol.is_empty());
    }

    #[test]
    fn bootstraps_without_heuristic_on_k4() {
        let g = TransactionGraph::from_conflicts(2, &[]).unwrap();
        let solver = CDSSolverInterface::new(g, Vec::new(), false, true);
        let sol = solver.optimize(Vec::new(), 5, 2.0, false).unwrap();
        assert_eq!(sol.len(), 1);
        assert!(solver.has_optimal_solution());
        assert!(!solver.iteration_statistics().is_empty());
    }

    #[test]
    fn rejects_invalid_initial_solution() {
        let g = TransactionGraph::from_conflicts(2, &[(lit(1), lit(2))]).unwrap();
        let bad_initial = vec![canonical_edge(lit(1), lit(2))]; // not an edge: it's a conflict
        let solver = CDSSolverInterface::new(g, Vec::new(), false, true);
        let err = solver.optimize(bad_initial, 1, 1.0, false).unwrap_err();
        assert!(matches!(
            err,
            crate::cds::error::CdsError::InvalidInitialSolution(_)
        ));
    }

    #[test]
    fn finds_size_two_cds_on_forced_disjoint_pair() {
        let conflicts = vec![canonical_edge(lit(1), lit(2)), canonical_edge(lit(-1), lit(-2))];
        let g = TransactionGraph::from_conflicts(2, &conflicts).unwrap();
        let solver = CDSSolverInterface::new(g, Vec::new(), false, true);
        let sol = solver.optimize(Vec::new(), 10, 2.0, false).unwrap();
        assert_eq!(sol.len(), 2);
    }
}
