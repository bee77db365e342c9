/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */
use crate::cds::error::{CdsError, CdsResult};

const WORD_BITS: usize = 64;

/// Maps a strict-upper-triangle cell `(lo, hi)` with `lo < hi < n` to a
/// flat offset: the offset of row `lo`'s first cell plus the position
/// within that row. Shared by `TriangularMatrix` and `CounterMatrix` so
/// the same formula is never duplicated (and never drifts out of sync).
pub(crate) fn triangular_index(n: usize, lo: usize, hi: usize) -> usize {
    let row_start = lo * n - lo * (lo + 1) / 2;
    row_start + (hi - lo - 1)
}

/// A bit-packed symmetric boolean matrix over `n` indices, storing only
/// the strict upper triangle (`i < j`). Cell `(i, j)` lives at
/// `i*n - i*(i+1)/2 + j - i - 1`, the usual compaction of a triangular
/// array into a flat bit vector.
#[derive(Clone)]
pub struct TriangularMatrix {
    n: usize,
    words: Vec<u64>,
}

impl TriangularMatrix {
    pub fn new(n: usize) -> Self {
        let num_cells = Self::cell_count(n);
        let num_words = (num_cells + WORD_BITS - 1) / WORD_BITS;
        Self {
            n,
            words: vec![0u64; num_words.max(1)],
        }
    }

    fn cell_count(n: usize) -> usize {
        if n < 2 {
            0
        } else {
            n * (n - 1) / 2
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    fn cell_index(&self, i: usize, j: usize) -> CdsResult<usize> {
        if i == j {
            return Err(CdsError::SelfLoopQuery(i as i64));
        }
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        Ok(triangular_index(self.n, lo, hi))
    }

    pub fn get(&self, i: usize, j: usize) -> CdsResult<bool> {
        let idx = self.cell_index(i, j)?;
        let word = idx / WORD_BITS;
        let bit = idx % WORD_BITS;
        Ok((self.words[word] >> bit) & 1 == 1)
    }

    pub fn set(&mut self, i: usize, j: usize, value: bool) -> CdsResult<()> {
        let idx = self.cell_index(i, j)?;
        let word = idx / WORD_BITS;
        let bit = idx % WORD_BITS;
        if value {
            self.words[word] |= 1u64 << bit;
        } else {
            self.words[word] &= !(1u64 << bit);
        }
        Ok(())
    }

    /// Inverts every bit in the matrix, turning a conflict graph into its
    /// complement in one pass. Used exactly once, at construction time,
    /// to build the transaction graph from the conflict graph.
    pub fn flip(&mut self) {
        for w in self.words.iter_mut() {
            *w = !*w;
        }
        self.mask_trailing_bits();
    }

    /// The last word may have unused high bits past `cell_count`; keep
    /// them clear so `popcount` stays accurate after a `flip`.
    fn mask_trailing_bits(&mut self) {
        let num_cells = Self::cell_count(self.n);
        let used_bits_in_last_word = num_cells % WORD_BITS;
        if used_bits_in_last_word != 0 {
            if let Some(last) = self.words.last_mut() {
                let mask = (1u64 << used_bits_in_last_word) - 1;
                *last &= mask;
            }
        }
    }

    pub fn popcount(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }
}
