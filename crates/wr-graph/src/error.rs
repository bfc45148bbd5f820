//! Graph-subsystem error type.

use thiserror::Error;

/// Errors produced by `wr-graph`.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node {0:?} not found in graph")]
    UnknownNode(String),

    #[error("no path from {from:?} to {to:?}")]
    NoPath { from: String, to: String },

    #[error("edge {from:?} -> {to:?} has invalid weight {weight}")]
    InvalidWeight { from: String, to: String, weight: f64 },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GraphResult<T> = Result<T, GraphError>;
