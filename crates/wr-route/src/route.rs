//! The persisted route record.

use serde::{Deserialize, Serialize};

use wr_core::{NodeId, OperatorId, RouteId, Timestamp};

use crate::{RouteError, RouteResult, RouteStatus};

/// A route assigned to an operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id:             RouteId,
    pub assigned_to:    OperatorId,
    /// Stops in travel order.
    pub nodes:          Vec<NodeId>,
    /// Kilometres, as computed on the graph used for the search.
    pub total_distance: f64,
    pub status:         RouteStatus,
    pub created_at:     Timestamp,
    pub started_at:     Option<Timestamp>,
    pub completed_at:   Option<Timestamp>,
}

impl Route {
    /// Move to `to`, stamping `started_at` or `completed_at` with `at`.
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidTransition`] for anything but
    /// `pending → active` or `active → completed`; the route is unchanged.
    pub fn apply_transition(&mut self, to: RouteStatus, at: Timestamp) -> RouteResult<()> {
        if !self.status.can_transition_to(to) {
            return Err(RouteError::InvalidTransition { route: self.id, from: self.status, to });
        }
        match to {
            RouteStatus::Active    => self.started_at = Some(at),
            RouteStatus::Completed => self.completed_at = Some(at),
            RouteStatus::Pending   => {}
        }
        self.status = to;
        Ok(())
    }

    /// Sort key for "most recently created": creation time, then id.
    #[inline]
    pub(crate) fn recency(&self) -> (Timestamp, RouteId) {
        (self.created_at, self.id)
    }
}

/// Everything a store needs to create a `pending` route.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRoute {
    pub assigned_to:    OperatorId,
    pub nodes:          Vec<NodeId>,
    pub total_distance: f64,
    pub created_at:     Timestamp,
}

impl NewRoute {
    pub(crate) fn into_route(self, id: RouteId) -> Route {
        Route {
            id,
            assigned_to:    self.assigned_to,
            nodes:          self.nodes,
            total_distance: self.total_distance,
            status:         RouteStatus::Pending,
            created_at:     self.created_at,
            started_at:     None,
            completed_at:   None,
        }
    }
}
