/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */
use crate::cds::error::CdsResult;
use crate::cds::ip_oracle::{BranchAndBoundOracle, MaxIndependentSetOracle, OracleStatus};
use crate::cds::literal::LiteralId;
use crate::cds::transaction_graph::TransactionGraph;
use std::time::Duration;

/// Exact maximum independent set on a small induced subgraph, delegated
/// to an `IpOracle`. Model: one binary per node; for every edge `(u,v)`
/// of the induced subgraph, `x_u + x_v <= 1`; maximize `sum x`.
pub struct MisSubsolver<O: MaxIndependentSetOracle = BranchAndBoundOracle> {
    oracle: O,
}

impl Default for MisSubsolver<BranchAndBoundOracle> {
    fn default() -> Self {
        Self {
            oracle: BranchAndBoundOracle::new(),
        }
    }
}

impl<O: MaxIndependentSetOracle> MisSubsolver<O> {
    pub fn with_oracle(oracle: O) -> Self {
        Self { oracle }
    }

    /// Maximizes `|subset|` of `nodes` subject to: every pair of
    /// distinct selected nodes is a non-edge of `graph`. On a
    /// non-positive timeout, or on timeout before the search completes,
    /// returns the hint unmodified.
    pub fn solve(
        &self,
        graph: &TransactionGraph,
        nodes: &[LiteralId],
        timeout: Duration,
        hint: &[LiteralId],
    ) -> CdsResult<(Vec<LiteralId>, OracleStatus)> {
        self.oracle.solve(
            nodes,
            |a, b| graph.has_edge(*a, *b).unwrap_or(false),
            timeout,
            hint,
        )
    }
}
