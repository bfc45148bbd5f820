//! Assignment and lifecycle operations over a [`RouteStore`].

use tracing::{debug, info};

use wr_core::{Clock, OperatorId, RouteId, SystemClock};
use wr_graph::NetworkSnapshot;

use crate::{NewRoute, Route, RouteError, RouteResult, RouteStatus, RouteStore};

/// The outcome of [`RouteManager::assign`].
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub route:   Route,
    /// Requested node names that matched no node and were left out.
    pub dropped: Vec<String>,
}

/// Owns the route state machine on top of a store and a clock.
///
/// # Type parameters
///
/// `S` is the storage backend ([`crate::MemoryRouteStore`], or
/// `SqliteRouteStore` with the `sqlite` feature).  `C` supplies timestamps;
/// tests drive it with a [`wr_core::ManualClock`].
pub struct RouteManager<S: RouteStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
}

impl<S: RouteStore> RouteManager<S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: RouteStore, C: Clock> RouteManager<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a `pending` route for `operator` through `names` (path order).
    ///
    /// Names are resolved against `network`; unknown names are dropped and
    /// reported in [`Assignment::dropped`].  `total_distance` is stored as
    /// given, it is the figure the solver reported for the path.
    ///
    /// # Errors
    ///
    /// - [`RouteError::NoResolvableNodes`] if not a single name resolves.
    /// - [`RouteError::OperatorBusy`] if the operator still has a
    ///   `pending`/`active` route.
    pub fn assign<N: AsRef<str>>(
        &self,
        operator:       OperatorId,
        names:          &[N],
        total_distance: f64,
        network:        &NetworkSnapshot,
    ) -> RouteResult<Assignment> {
        let (nodes, dropped) = network.resolve_names(names);
        if nodes.is_empty() {
            return Err(RouteError::NoResolvableNodes(names.len()));
        }

        let draft = NewRoute {
            assigned_to: operator,
            nodes,
            total_distance,
            created_at: self.clock.now(),
        };
        let route = self.store.insert_if_idle(draft)?;

        info!(
            route    = %route.id,
            operator = %route.assigned_to,
            stops    = route.nodes.len(),
            dropped  = dropped.len(),
            km       = route.total_distance,
            "route assigned"
        );
        Ok(Assignment { route, dropped })
    }

    /// Move route `id` to `status`, stamping the matching timestamp.
    ///
    /// # Errors
    ///
    /// [`RouteError::NotFound`] or [`RouteError::InvalidTransition`].
    pub fn set_status(&self, id: RouteId, status: RouteStatus) -> RouteResult<Route> {
        let route = self.store.transition(id, status, self.clock.now())?;
        info!(route = %id, operator = %route.assigned_to, status = %status, "route status changed");
        Ok(route)
    }

    /// Convenience for `set_status(id, Active)`.
    pub fn start(&self, id: RouteId) -> RouteResult<Route> {
        self.set_status(id, RouteStatus::Active)
    }

    /// Convenience for `set_status(id, Completed)`.
    pub fn complete(&self, id: RouteId) -> RouteResult<Route> {
        self.set_status(id, RouteStatus::Completed)
    }

    pub fn route(&self, id: RouteId) -> RouteResult<Route> {
        self.store.get(id)?.ok_or(RouteError::NotFound(id))
    }

    /// The operator's most recently created non-completed route, if any.
    pub fn assigned_route(&self, operator: &OperatorId) -> RouteResult<Option<Route>> {
        let route = self.store.latest_open(operator)?;
        debug!(operator = %operator, found = route.is_some(), "assigned route lookup");
        Ok(route)
    }

    pub fn completed_routes(&self, operator: &OperatorId) -> RouteResult<Vec<Route>> {
        self.store.completed(operator)
    }

    pub fn list_routes(&self) -> RouteResult<Vec<Route>> {
        self.store.list()
    }
}
