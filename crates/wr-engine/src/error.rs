use thiserror::Error;

use wr_core::{OperatorId, RouteId};
use wr_graph::GraphError;
use wr_hazard::HazardError;
use wr_route::{RouteError, RouteStatus};

/// Every failure the engine surfaces to a caller.
///
/// Weather and hazard-source outages never appear here; the engine degrades
/// to a neutral multiplier and carries on.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed or out-of-range request; retrying the same input fails again.
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("node {0:?} is not in the graph")]
    UnknownNode(String),

    #[error("no path from {from:?} to {to:?}")]
    NoPath { from: String, to: String },

    #[error("route {route} cannot move from {from} to {to}")]
    InvalidTransition {
        route: RouteId,
        from:  RouteStatus,
        to:    RouteStatus,
    },

    #[error("operator {operator} already has open route {route}")]
    OperatorBusy { operator: OperatorId, route: RouteId },

    #[error("route {0} not found")]
    RouteNotFound(RouteId),

    #[error("engine configuration error: {0}")]
    Config(String),

    /// The node/edge store could not be read.
    #[error("network source error: {0}")]
    Network(GraphError),

    #[error("route store error: {0}")]
    Store(RouteError),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl From<GraphError> for EngineError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::UnknownNode(name) => EngineError::UnknownNode(name),
            GraphError::NoPath { from, to } => EngineError::NoPath { from, to },
            GraphError::InvalidWeight { .. } => EngineError::Validation(e.to_string()),
            other => EngineError::Network(other),
        }
    }
}

impl From<RouteError> for EngineError {
    fn from(e: RouteError) -> Self {
        match e {
            RouteError::NotFound(id) => EngineError::RouteNotFound(id),
            RouteError::InvalidTransition { route, from, to } => {
                EngineError::InvalidTransition { route, from, to }
            }
            RouteError::OperatorBusy { operator, route } => EngineError::OperatorBusy { operator, route },
            RouteError::NoResolvableNodes(_) => EngineError::Validation(e.to_string()),
            other => EngineError::Store(other),
        }
    }
}

impl From<HazardError> for EngineError {
    fn from(e: HazardError) -> Self {
        EngineError::Config(e.to_string())
    }
}
