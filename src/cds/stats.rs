/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */
use serde::Serialize;
use std::collections::BTreeMap;

/// The fixed key order spec.md §6 requires for a single iteration's
/// statistics record. A `BTreeMap` keyed by these constants keeps
/// iteration order reproducible without hand-rolling insertion-order
/// bookkeeping.
pub const ITER_START: &str = "iter_start";
pub const NBHD_START: &str = "nbhd_start";
pub const NBHD_STOP: &str = "nbhd_stop";
pub const OPTIMIZE_START: &str = "optimize_start";
pub const OPTIMIZE_STOP: &str = "optimize_stop";
pub const NBHD_FIXED_SIZE: &str = "nbhd_fixed_size";
pub const NBHD_FREE_SIZE: &str = "nbhd_free_size";
pub const GRB_STATUS: &str = "grb_status";
pub const PROVEN_OPTIMAL: &str = "proven_optimal";
pub const FOUND_SOLUTION_SIZE: &str = "found_solution_size";
pub const GLOBAL_LB: &str = "global_lb";
pub const ITER_STOP: &str = "iter_stop";

/// A mapping `string -> int64`, written once per LNS iteration and
/// appended to a replayable log (`LnsEngine::iteration_statistics`).
#[derive(Debug, Clone, Default, Serialize)]
pub struct IterationStats(BTreeMap<&'static str, i64>);

impl IterationStats {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn set(&mut self, key: &'static str, value: i64) {
        self.0.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<i64> {
        self.0.get(key).copied()
    }
}

/// Current time in epoch-milliseconds, as spec.md §6 requires for the
/// timestamp fields. Backed by a monotonic-adjacent wall clock; callers
/// only ever compare two readings from the same process.
pub fn epoch_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
