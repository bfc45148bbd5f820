//! Typed inbound requests.
//!
//! Each request is deserialized into a struct and checked by `validate`
//! before anything reaches the graph or the route store.  Failures are
//! [`EngineError::Validation`].

use serde::{Deserialize, Serialize};

use wr_core::{OperatorId, RouteId};
use wr_graph::Graph;
use wr_route::RouteStatus;

use crate::{EngineError, EngineResult};

fn invalid(msg: impl Into<String>) -> EngineError {
    EngineError::Validation(msg.into())
}

fn parse<'de, T: Deserialize<'de>>(json: &'de str, what: &str) -> EngineResult<T> {
    serde_json::from_str(json).map_err(|e| invalid(format!("malformed {what}: {e}")))
}

// ── Compute ───────────────────────────────────────────────────────────────────

/// `{ graph: {node: {neighbor: weight}}, start, end }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeRouteRequest {
    pub graph: Graph,
    pub start: String,
    pub end:   String,
}

impl ComputeRouteRequest {
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let req: Self = parse(json, "compute request")?;
        req.validate()?;
        Ok(req)
    }

    /// Non-empty endpoints and graph; every weight finite and positive.
    ///
    /// Whether the endpoints are in the graph is left to the solver, which
    /// reports it as `UnknownNode` rather than a validation failure.
    pub fn validate(&self) -> EngineResult<()> {
        if self.start.trim().is_empty() || self.end.trim().is_empty() {
            return Err(invalid("start and end must be non-empty node names"));
        }
        if self.graph.is_empty() {
            return Err(invalid("graph has no nodes"));
        }
        self.graph.validate().map_err(|e| invalid(e.to_string()))
    }
}

// ── Assign ────────────────────────────────────────────────────────────────────

/// `{ operatorId, nodeNames, totalDistance }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRouteRequest {
    pub operator_id:    OperatorId,
    /// Path order.
    pub node_names:     Vec<String>,
    pub total_distance: f64,
}

impl AssignRouteRequest {
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let req: Self = parse(json, "assign request")?;
        req.validate()?;
        Ok(req)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.operator_id.is_blank() {
            return Err(invalid("operatorId must not be blank"));
        }
        if self.node_names.is_empty() {
            return Err(invalid("nodeNames must list at least one node"));
        }
        if !self.total_distance.is_finite() || self.total_distance < 0.0 {
            return Err(invalid(format!(
                "totalDistance must be a non-negative number, got {}",
                self.total_distance
            )));
        }
        Ok(())
    }
}

// ── Status update ─────────────────────────────────────────────────────────────

/// `{ routeId, status }` where `status` is `"active"` or `"completed"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub route_id: RouteId,
    pub status:   String,
}

impl StatusUpdateRequest {
    pub fn new(route_id: RouteId, status: impl Into<String>) -> Self {
        Self { route_id, status: status.into() }
    }

    pub fn from_json(json: &str) -> EngineResult<Self> {
        let req: Self = parse(json, "status update")?;
        req.target()?;
        Ok(req)
    }

    /// The requested status.  `pending` is never a valid target.
    pub fn target(&self) -> EngineResult<RouteStatus> {
        match self.status.parse::<RouteStatus>().map_err(invalid)? {
            RouteStatus::Pending => Err(invalid("status must be \"active\" or \"completed\"")),
            s => Ok(s),
        }
    }
}
