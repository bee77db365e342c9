/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */
//! The shape an external parser hands the core (spec.md §6). No
//! directory-parsing or deserialization-from-disk logic lives here —
//! only the plain data shape and the conversions the core itself needs.

use crate::cds::literal::{Edge, LiteralId};
use serde::{Deserialize, Serialize};

/// A boolean feature model instance, as produced by an external parser.
/// `clauses` is carried through for parity with the embedding surface
/// but is unused by the LNS core (spec.md §1 Out-of-scope).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    pub n_all: u64,
    pub n_concrete: u64,
    pub conflicts: Vec<(i64, i64)>,
    pub sample: Vec<Vec<i64>>,
    pub mutually_exclusive_set: Vec<(i64, i64)>,
    pub clauses: Vec<Vec<i64>>,
}

impl Instance {
    pub fn conflicts_as_edges(&self) -> Vec<Edge> {
        self.conflicts
            .iter()
            .map(|&(a, b)| (LiteralId::new(a), LiteralId::new(b)))
            .collect()
    }

    pub fn sample_as_literals(&self) -> Vec<Vec<LiteralId>> {
        self.sample
            .iter()
            .map(|config| config.iter().map(|&l| LiteralId::new(l)).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_signed_pairs_to_edges() {
        let inst = Instance {
            name: "t".to_string(),
            n_all: 4,
            n_concrete: 2,
            conflicts: vec![(1, 2), (-1, -2)],
            sample: vec![vec![1, -2], vec![-1, 2]],
            mutually_exclusive_set: vec![],
            clauses: vec![],
        };
        let edges = inst.conflicts_as_edges();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0], (LiteralId::new(1), LiteralId::new(2)));
        let sample = inst.sample_as_literals();
        assert_eq!(sample.len(), 2);
        assert_eq!(sample[0][0], LiteralId::new(1));
    }
}
