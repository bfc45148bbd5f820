//! The `RouteStore` trait and its in-memory implementation.

use std::sync::{Mutex, MutexGuard};

use wr_core::{OperatorId, RouteId, Timestamp};

use crate::{NewRoute, Route, RouteError, RouteResult, RouteStatus};

/// Persistence for route records.
///
/// Each method is one atomic step against the backing store.  In particular
/// [`insert_if_idle`](Self::insert_if_idle) and
/// [`transition`](Self::transition) must not let a concurrent call slip in
/// between their check and their write.
pub trait RouteStore: Send + Sync {
    /// Create a `pending` route unless the operator already has an open one.
    ///
    /// # Errors
    ///
    /// [`RouteError::OperatorBusy`] naming the operator's existing open route.
    fn insert_if_idle(&self, draft: NewRoute) -> RouteResult<Route>;

    fn get(&self, id: RouteId) -> RouteResult<Option<Route>>;

    /// Check and apply a status change, returning the updated record.
    fn transition(&self, id: RouteId, to: RouteStatus, at: Timestamp) -> RouteResult<Route>;

    /// The operator's most recently created `pending`/`active` route.
    fn latest_open(&self, operator: &OperatorId) -> RouteResult<Option<Route>>;

    /// The operator's completed routes, most recently completed first.
    fn completed(&self, operator: &OperatorId) -> RouteResult<Vec<Route>>;

    /// Every route, newest first.
    fn list(&self) -> RouteResult<Vec<Route>>;
}

// ── MemoryRouteStore ──────────────────────────────────────────────────────────

/// A `Mutex<Vec<Route>>` store.  Ids are allocated sequentially from 1.
#[derive(Debug, Default)]
pub struct MemoryRouteStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    routes:  Vec<Route>,
    last_id: u64,
}

impl MemoryRouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> RouteResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| RouteError::Storage("route store lock poisoned".into()))
    }
}

impl RouteStore for MemoryRouteStore {
    fn insert_if_idle(&self, draft: NewRoute) -> RouteResult<Route> {
        let mut inner = self.lock()?;

        if let Some(open) = latest_open_in(&inner.routes, &draft.assigned_to) {
            return Err(RouteError::OperatorBusy {
                operator: draft.assigned_to,
                route:    open.id,
            });
        }

        inner.last_id += 1;
        let route = draft.into_route(RouteId(inner.last_id));
        inner.routes.push(route.clone());
        Ok(route)
    }

    fn get(&self, id: RouteId) -> RouteResult<Option<Route>> {
        Ok(self.lock()?.routes.iter().find(|r| r.id == id).cloned())
    }

    fn transition(&self, id: RouteId, to: RouteStatus, at: Timestamp) -> RouteResult<Route> {
        let mut inner = self.lock()?;
        let route = inner
            .routes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RouteError::NotFound(id))?;
        route.apply_transition(to, at)?;
        Ok(route.clone())
    }

    fn latest_open(&self, operator: &OperatorId) -> RouteResult<Option<Route>> {
        Ok(latest_open_in(&self.lock()?.routes, operator).cloned())
    }

    fn completed(&self, operator: &OperatorId) -> RouteResult<Vec<Route>> {
        let mut done: Vec<Route> = self
            .lock()?
            .routes
            .iter()
            .filter(|r| &r.assigned_to == operator && r.status == RouteStatus::Completed)
            .cloned()
            .collect();
        done.sort_by(|a, b| (b.completed_at, b.id).cmp(&(a.completed_at, a.id)));
        Ok(done)
    }

    fn list(&self) -> RouteResult<Vec<Route>> {
        let mut all = self.lock()?.routes.clone();
        all.sort_by_key(|r| std::cmp::Reverse(r.recency()));
        Ok(all)
    }
}

fn latest_open_in<'a>(routes: &'a [Route], operator: &OperatorId) -> Option<&'a Route> {
    routes
        .iter()
        .filter(|r| &r.assigned_to == operator && r.status.is_open())
        .max_by_key(|r| r.recency())
}
