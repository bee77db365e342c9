/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */
use crate::cds::solution::Cds;

/// Default capacity of a `SolutionPool` (spec.md §3: `SOLUTION_POOL_SIZE`).
pub const SOLUTION_POOL_SIZE: usize = 20;

/// A bounded sequence of distinct CDS solutions, ordered by size
/// descending.
pub struct SolutionPool {
    capacity: usize,
    solutions: Vec<Cds>,
}

impl SolutionPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            solutions: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// Inserts `sol` if not already present (by order-independent
    /// equality), re-sorts descending by size, and truncates to
    /// capacity.
    pub fn insert(&mut self, sol: Cds) {
        if self.solutions.iter().any(|s| s == &sol) {
            return;
        }
        self.solutions.push(sol);
        self.solutions.sort_by_key(|s| std::cmp::Reverse(s.len()));
        self.solutions.truncate(self.capacity);
    }

    pub fn get(&self, idx: usize) -> Option<&Cds> {
        self.solutions.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cds> {
        self.solutions.iter()
    }

    /// Picks a uniformly random entry, used by the selector to
    /// diversify its seed after stagnation.
    pub fn random_entry(&self, rng: &mut impl rand::Rng) -> Option<&Cds> {
        if self.solutions.is_empty() {
            None
        } else {
            let idx = rng.gen_range(0..self.solutions.len());
            self.solutions.get(idx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cds::literal::LiteralId;
    use rand::SeedableRng;

    fn lit(v: i64) -> LiteralId {
        LiteralId::new(v)
    }

    #[test]
    fn sorted_descending_and_bounded() {
        let mut pool = SolutionPool::new(2);
        pool.insert(Cds::new(vec![(lit(1), lit(2))]));
        pool.insert(Cds::new(vec![(lit(1), lit(2)), (lit(3), lit(4))]));
        pool.insert(Cds::new(vec![(lit(5), lit(6))]));
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(0).unwrap().len(), 2);
    }

    #[test]
    fn dedups_by_order_independent_equality() {
        let mut pool = SolutionPool::new(20);
        pool.insert(Cds::new(vec![(lit(1), lit(2)), (lit(3), lit(4))]));
        pool.insert(Cds::new(vec![(lit(3), lit(4)), (lit(1), lit(2))]));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn random_entry_is_deterministic_given_seed() {
        let mut pool = SolutionPool::new(5);
        pool.insert(Cds::new(vec![(lit(1), lit(2))]));
        pool.insert(Cds::new(vec![(lit(3), lit(4))]));
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        assert!(pool.random_entry(&mut rng).is_some());
    }
}
