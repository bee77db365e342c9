/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */
use crate::cds::error::CdsResult;
use crate::cds::literal::{literal_to_index, Edge, LiteralId};
use crate::cds::triangular_matrix::triangular_index;

/// Integer-valued symmetric triangular matrix indexed by literal pairs,
/// used to count how many sampled configurations already witness each
/// pair (the "covering count").
pub struct CounterMatrix {
    n_concrete: i64,
    n: usize,
    cells: Vec<u32>,
}

impl CounterMatrix {
    pub fn new(n_concrete: i64) -> Self {
        let n = (2 * n_concrete) as usize;
        let num_cells = if n < 2 { 0 } else { n * (n - 1) / 2 };
        Self {
            n_concrete,
            n,
            cells: vec![0u32; num_cells],
        }
    }

    fn cell_index(&self, i: usize, j: usize) -> usize {
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        triangular_index(self.n, lo, hi)
    }

    pub fn increment(&mut self, a: LiteralId, b: LiteralId, delta: u32) -> CdsResult<()> {
        let ia = literal_to_index(a, self.n_concrete)?;
        let ib = literal_to_index(b, self.n_concrete)?;
        let idx = self.cell_index(ia, ib);
        self.cells[idx] = self.cells[idx].saturating_add(delta);
        Ok(())
    }

    pub fn get(&self, a: LiteralId, b: LiteralId) -> CdsResult<u32> {
        let ia = literal_to_index(a, self.n_concrete)?;
        let ib = literal_to_index(b, self.n_concrete)?;
        Ok(self.cells[self.cell_index(ia, ib)])
    }

    pub fn get_edge(&self, e: Edge) -> CdsResult<u32> {
        self.get(e.0, e.1)
    }

    /// Populates the matrix from a sample of feature configurations: for
    /// each configuration, every pair of literals in it gets incremented.
    pub fn from_sample(n_concrete: i64, sample: &[Vec<LiteralId>]) -> CdsResult<Self> {
        let mut m = Self::new(n_concrete);
        for config in sample {
            for i in 0..config.len() {
                for j in (i + 1)..config.len() {
                    m.increment(config[i], config[j], 1)?;
                }
            }
        }
        Ok(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(v: i64) -> LiteralId {
        LiteralId::new(v)
    }

    #[test]
    fn increment_accumulates_symmetrically() {
        let mut m = CounterMatrix::new(3);
        m.increment(lit(1), lit(2), 1).unwrap();
        m.increment(lit(2), lit(1), 2).unwrap();
        assert_eq!(m.get(lit(1), lit(2)).unwrap(), 3);
        assert_eq!(m.get(lit(2), lit(1)).unwrap(), 3);
    }

    #[test]
    fn from_sample_counts_pairs() {
        let sample = vec![vec![lit(1), lit(2), lit(-3)], vec![lit(1), lit(2)]];
        let m = CounterMatrix::from_sample(3, &sample).unwrap();
        assert_eq!(m.get(lit(1), lit(2)).unwrap(), 2);
        assert_eq!(m.get(lit(1), lit(-3)).unwrap(), 1);
        assert_eq!(m.get(lit(2), lit(-3)).unwrap(), 1);
    }

    #[test]
    fn distinct_pairs_never_alias_onto_the_same_cell() {
        // n_concrete=2 (n=4 literal indices): every one of the 6 distinct
        // literal pairs must keep an independent count.
        let mut m = CounterMatrix::new(2);
        m.increment(lit(-2), lit(-1), 1).unwrap();
        m.increment(lit(-2), lit(1), 1).unwrap();
        m.increment(lit(-2), lit(2), 1).unwrap();
        m.increment(lit(-1), lit(1), 1).unwrap();
        m.increment(lit(-1), lit(2), 1).unwrap();
        m.increment(lit(1), lit(2), 1).unwrap();
        assert_eq!(m.get(lit(-2), lit(-1)).unwrap(), 1);
        assert_eq!(m.get(lit(-2), lit(1)).unwrap(), 1);
        assert_eq!(m.get(lit(-2), lit(2)).unwrap(), 1);
        assert_eq!(m.get(lit(-1), lit(1)).unwrap(), 1);
        assert_eq!(m.get(lit(-1), lit(2)).unwrap(), 1);
        assert_eq!(m.get(lit(1), lit(2)).unwrap(), 1);
    }
}
