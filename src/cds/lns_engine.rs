/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */
//! Generic LNS loop (spec.md §4.8). The original class hierarchy
//! (`ModularLNS <- LowerBoundLNS <- CdsSolver`) expresses a small set of
//! capabilities -- score, optimality check, sub-neighborhood
//! optimization, new-solution notification -- which here is a single
//! `LnsCapability` trait injected into the engine, per the REDESIGN
//! FLAGS note on capability records.

use crate::cds::cds_neighborhood_selector::CdsNeighborhoodSelector;
use crate::cds::error::CdsResult;
use crate::cds::literal::Edge;
use crate::cds::neighborhood::Neighborhood;
use crate::cds::stats::{
    epoch_millis, IterationStats, ITER_START, ITER_STOP, NBHD_FIXED_SIZE, NBHD_FREE_SIZE,
    NBHD_START, NBHD_STOP, OPTIMIZE_START, OPTIMIZE_STOP,
};
use crate::cds::transaction_graph::TransactionGraph;
use rand::Rng;
use std::time::{Duration, Instant};

/// The capability record an `LnsEngine` is generic over: how to score a
/// candidate solution, how to solve one sub-neighborhood exactly, and
/// how to tell when the running solution is provably optimal.
pub trait LnsCapability {
    fn score(&self, sol: &[Edge]) -> i64;

    /// `current_best_score` lets the capability record `global_lb`
    /// (spec.md §4.8: `max(|sol|, |best|)`) without the engine's own
    /// best-known solution leaking into the capability's API surface.
    fn optimize_neighborhood(
        &mut self,
        graph: &TransactionGraph,
        nbhd: &Neighborhood,
        timeout: Duration,
        current_best_score: i64,
        stats: &mut IterationStats,
    ) -> CdsResult<Vec<Edge>>;

    fn is_optimal(&self) -> bool;

    fn new_solution_callback(&mut self, sol: &[Edge]);
}

/// Generic LNS engine: owns a selector, a best-known solution, a
/// monotone lower bound, a callback list, and the per-iteration
/// statistics log.
pub struct LnsEngine<C: LnsCapability> {
    capability: C,
    selector: CdsNeighborhoodSelector,
    best: Vec<Edge>,
    lb: i64,
    optimal: bool,
    callbacks: Vec<Box<dyn FnMut(&[Edge]) + Send>>,
    iteration_statistics: Vec<IterationStats>,
}

impl<C: LnsCapability> LnsEngine<C> {
    pub fn new(capability: C, selector: CdsNeighborhoodSelector) -> Self {
        Self {
            capability,
            selector,
            best: Vec::new(),
            lb: -1,
            optimal: false,
            callbacks: Vec::new(),
            iteration_statistics: Vec::new(),
        }
    }

    pub fn best_solution(&self) -> &[Edge] {
        &self.best
    }

    pub fn lb(&self) -> i64 {
        self.lb
    }

    pub fn is_optimal(&self) -> bool {
        self.optimal
    }

    pub fn iteration_statistics(&self) -> &[IterationStats] {
        &self.iteration_statistics
    }

    pub fn add_callback(&mut self, cb: Box<dyn FnMut(&[Edge]) + Send>) {
        self.callbacks.push(cb);
    }

    /// Publishes an externally-known solution without running an
    /// iteration. Used by the top-level facade to seed the engine
    /// before the run loop starts (spec.md §4.9 step 6).
    pub fn add_solution(&mut self, sol: Vec<Edge>) {
        let score = self.capability.score(&sol);
        if score > self.lb {
            self.best = sol.clone();
            self.lb = score;
            self.selector.better_solution_callback(&sol);
            for cb in &mut self.callbacks {
                cb(&sol);
            }
        }
        self.capability.new_solution_callback(&sol);
    }

    /// Runs iterations until `max_iterations` is reached or optimality
    /// is proven.
    pub fn run(
        &mut self,
        graph: &TransactionGraph,
        max_iterations: usize,
        iteration_timelimit: Duration,
        rng: &mut impl Rng,
    ) -> CdsResult<()> {
        for _ in 0..max_iterations {
            self.run_iteration(graph, iteration_timelimit, rng)?;
            if self.optimal {
                break;
            }
        }
        Ok(())
    }

    fn run_iteration(
        &mut self,
        graph: &TransactionGraph,
        iteration_timelimit: Duration,
        rng: &mut impl Rng,
    ) -> CdsResult<()> {
        let mut stats = IterationStats::new();
        let iter_start_instant = Instant::now();
        stats.set(ITER_START, epoch_millis());

        let nbhd_start_instant = Instant::now();
        stats.set(NBHD_START, epoch_millis());
        let nb = self.selector.next(graph, rng)?;
        stats.set(NBHD_STOP, epoch_millis());
        let t_nbhd = nbhd_start_instant.elapsed();
        stats.set(NBHD_FIXED_SIZE, nb.fixed.len() as i64);
        stats.set(NBHD_FREE_SIZE, nb.free.len() as i64);

        stats.set(OPTIMIZE_START, epoch_millis());
        let sol = self.capability.optimize_neighborhood(
            graph,
            &nb,
            iteration_timelimit,
            self.lb,
            &mut stats,
        )?;
        stats.set(OPTIMIZE_STOP, epoch_millis());
        let t_total = iter_start_instant.elapsed();

        let t_util = t_total.as_secs_f64() / iteration_timelimit.as_secs_f64().max(1e-9);
        let nb_util = t_nbhd.as_secs_f64() / t_total.as_secs_f64().max(1e-9);

        let score = self.capability.score(&sol);
        if score > self.lb {
            self.best = sol.clone();
            self.lb = score;
            self.selector.better_solution_callback(&sol);
            for cb in &mut self.callbacks {
                cb(&sol);
            }
        }

        self.capability.new_solution_callback(&sol);

        if self.capability.is_optimal() {
            self.optimal = true;
        }

        self.selector.feedback(&sol, t_util, nb_util);
        stats.set(ITER_STOP, epoch_millis());
        self.iteration_statistics.push(stats);
        Ok(())
    }
}
