use thiserror::Error;

use wr_core::{OperatorId, RouteId};

use crate::RouteStatus;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route {0} not found")]
    NotFound(RouteId),

    #[error("route {route} cannot move from {from} to {to}")]
    InvalidTransition {
        route: RouteId,
        from:  RouteStatus,
        to:    RouteStatus,
    },

    #[error("operator {operator} already has open route {route}")]
    OperatorBusy { operator: OperatorId, route: RouteId },

    #[error("none of the {0} requested node names resolve to a known node")]
    NoResolvableNodes(usize),

    #[error("storage error: {0}")]
    Storage(String),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type RouteResult<T> = Result<T, RouteError>;
