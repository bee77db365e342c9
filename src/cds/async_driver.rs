/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */
//! Runs a `CDSSolverInterface` on a single background worker with
//! cooperative cancellation and published best-so-far snapshots
//! (spec.md §4.10, §5).

use crate::cds::cds_solver::CDSSolverInterface;
use crate::cds::error::{CdsError, CdsResult};
use crate::cds::literal::Edge;
use crate::cds::solution::Cds;
use crate::cds::stats::IterationStats;
use crossbeam_utils::atomic::AtomicCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};

/// A counting semaphore of capacity 1: `try_acquire` never blocks,
/// `acquire_blocking` blocks until the slot frees up.
struct BinarySemaphore {
    available: Mutex<bool>,
    cv: Condvar,
}

impl BinarySemaphore {
    fn new() -> Self {
        Self {
            available: Mutex::new(true),
            cv: Condvar::new(),
        }
    }

    fn try_acquire(&self) -> bool {
        let mut guard = self.available.lock().unwrap();
        if *guard {
            *guard = false;
            true
        } else {
            false
        }
    }

    fn acquire_blocking(&self) {
        let mut guard = self.available.lock().unwrap();
        while !*guard {
            guard = self.cv.wait(guard).unwrap();
        }
        *guard = false;
    }

    fn release(&self) {
        let mut guard = self.available.lock().unwrap();
        *guard = true;
        self.cv.notify_all();
    }

    fn is_available(&self) -> bool {
        *self.available.lock().unwrap()
    }
}

/// Wraps a `CDSSolverInterface` with exactly one background worker,
/// cooperative stop, and a snapshot of the best solution seen so far.
pub struct AsyncDriver {
    solver: Arc<CDSSolverInterface>,
    running_guard: Arc<BinarySemaphore>,
    stop_flag: Arc<AtomicBool>,
    time_limit: Arc<AtomicCell<f64>>,
    best_snapshot: Arc<Mutex<Option<Cds>>>,
}

impl AsyncDriver {
    pub fn new(solver: CDSSolverInterface) -> Self {
        let best_snapshot: Arc<Mutex<Option<Cds>>> = Arc::new(Mutex::new(None));
        let snapshot_for_callback = Arc::clone(&best_snapshot);
        solver.register_callback(Box::new(move |sol: &[Edge]| {
            let mut guard = snapshot_for_callback.lock().unwrap();
            *guard = Some(Cds::new(sol.to_vec()));
        }));
        Self {
            solver: Arc::new(solver),
            running_guard: Arc::new(BinarySemaphore::new()),
            stop_flag: Arc::new(AtomicBool::new(false)),
            time_limit: Arc::new(AtomicCell::new(60.0)),
            best_snapshot,
        }
    }

    /// Tries to acquire the running guard without blocking. Returns
    /// `false` if a worker is already live. On success, resets the stop
    /// flag, sets the iteration time limit, and spawns a detached
    /// worker thread.
    pub fn start(&self, initial: Vec<Edge>, iteration_timelimit: f64) -> bool {
        if !self.running_guard.try_acquire() {
            return false;
        }
        self.stop_flag.store(false, Ordering::SeqCst);
        self.time_limit.store(iteration_timelimit);

        let solver = Arc::clone(&self.solver);
        let running_guard = Arc::clone(&self.running_guard);
        let stop_flag = Arc::clone(&self.stop_flag);
        let time_limit = Arc::clone(&self.time_limit);

        let spawned = std::thread::Builder::new()
            .name("cds-async-driver".to_string())
            .spawn(move || {
                while !stop_flag.load(Ordering::Acquire) && !solver.has_optimal_solution() {
                    let tl = time_limit.load();
                    if let Err(e) = solver.optimize(initial.clone(), 1, tl, true) {
                        eprintln!("async_driver: iteration failed: {e}");
                        break;
                    }
                }
                running_guard.release();
            });

        match spawned {
            Ok(_) => true,
            Err(e) => {
                eprintln!("async_driver: failed to spawn worker: {e}");
                self.running_guard.release();
                false
            }
        }
    }

    /// No-op if no worker is live. Otherwise requests cancellation,
    /// blocks until the worker observes it and exits, then releases the
    /// guard again so a subsequent `start()` may succeed.
    pub fn stop(&self) {
        if self.running_guard.is_available() {
            return;
        }
        self.stop_flag.store(true, Ordering::SeqCst);
        self.running_guard.acquire_blocking();
        self.running_guard.release();
    }

    /// Copies out the best solution published so far, validating it is
    /// still clique-disjoint in the owning graph.
    pub fn snapshot(&self) -> CdsResult<Cds> {
        let cds = {
            let guard = self.best_snapshot.lock().unwrap();
            guard.clone()
        }
        .ok_or_else(|| CdsError::CorruptedSnapshot("no snapshot published yet".to_string()))?;
        if !self.solver.graph().is_clique_disjoint_set(&cds.edges)? {
            return Err(CdsError::CorruptedSnapshot(
                "published snapshot is not clique-disjoint".to_string(),
            ));
        }
        Ok(cds)
    }

    pub fn iteration_statistics(&self) -> Vec<IterationStats> {
        self.solver.iteration_statistics()
    }
}
