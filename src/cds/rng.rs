/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */
//! Per-thread RNG plumbing (spec.md §5). The 70/30 shake coin and the
//! pool-index draw are *shake* sources only — never safety-critical —
//! but two concurrently-live threads must never share a stream. Rather
//! than reach for a process-global `rand()`, every caller that needs
//! randomness gets its own `StdRng` seeded from a process-wide atomic
//! counter, so no two streams collide even when callers race.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicU64, Ordering};

static SEED_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Returns a fresh, independently-seeded RNG. Safe to call from any
/// thread at any time; never shares a stream with a concurrently-live
/// caller.
pub fn new_rng() -> StdRng {
    let seed = SEED_COUNTER.fetch_add(1, Ordering::Relaxed);
    StdRng::seed_from_u64(seed)
}
