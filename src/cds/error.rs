/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */
// https://blog.burntsushi.net/rust-error-handling/

use thiserror::Error;

pub type CdsResult<T> = std::result::Result<T, CdsError>;

#[derive(Debug, Error)]
pub enum CdsError {
    #[error("{0}")]
    Generic(String),

    #[error("invalid literal: {0}")]
    InvalidLiteral(i64),

    #[error("self-loop query on literal {0}")]
    SelfLoopQuery(i64),

    #[error("subgraph contains an edge absent from the graph: {0:?}")]
    InvalidSubgraph((i64, i64)),

    #[error("initial solution contains an edge outside the active subgraph: {0:?}")]
    InitialSolutionOutsideSubgraph((i64, i64)),

    #[error("initial solution is not a valid clique-disjoint edge set: {0}")]
    InvalidInitialSolution(String),

    #[error("internal invariant broken: {0}")]
    InternalInvariantBroken(String),

    #[error("IP/MIS oracle malfunction: {0}")]
    OracleError(String),

    #[error("async snapshot failed validation: {0}")]
    CorruptedSnapshot(String),

    #[error("Parse error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    #[error("JSON error: {0}")]
    JSON(#[from] serde_json::Error),
}

impl CdsError {
    pub fn new(msg: &str) -> Self {
        Self::Generic(msg.to_owned())
    }
    pub fn err_none() -> Self {
        Self::Generic("Unexpectedly empty Option encountered.".to_owned())
    }
}

impl From<String> for CdsError {
    fn from(str: String) -> Self {
        CdsError::Generic(str)
    }
}

impl From<&str> for CdsError {
    fn from(str: &str) -> Self {
        CdsError::Generic(str.to_owned())
    }
}
