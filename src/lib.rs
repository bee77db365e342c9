/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */
extern crate rand;
extern crate thiserror;

pub mod cds;

pub use cds::async_driver::AsyncDriver;
pub use cds::cds_ip_subsolver::CdsIpSubsolver;
pub use cds::cds_neighborhood_selector::CdsNeighborhoodSelector;
pub use cds::cds_solver::{CDSSolverInterface, CdsSolver};
pub use cds::counter_matrix::CounterMatrix;
pub use cds::error::{CdsError, CdsResult};
pub use cds::greedy_cds::GreedyCds;
pub use cds::instance::Instance;
pub use cds::ip_oracle::{BranchAndBoundOracle, MaxIndependentSetOracle, OracleStatus};
pub use cds::literal::{canonical_edge, literal_to_index, Edge, LiteralId};
pub use cds::lns_engine::{LnsCapability, LnsEngine};
pub use cds::mis_heuristic_cds::{merge_rule, MisHeuristicCds, MisNodeSelector};
pub use cds::mis_subsolver::MisSubsolver;
pub use cds::neighborhood::Neighborhood;
pub use cds::solution::Cds;
pub use cds::solution_pool::SolutionPool;
pub use cds::stats::IterationStats;
pub use cds::transaction_graph::TransactionGraph;
pub use cds::triangular_matrix::TriangularMatrix;
