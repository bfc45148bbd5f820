//! Unit tests for wr-route.

use std::sync::Arc;

use wr_core::{EdgeId, GeoPoint, ManualClock, NodeId, OperatorId, RouteId, Timestamp};
use wr_graph::{Edge, NetworkSnapshot, Node};

use crate::{MemoryRouteStore, NewRoute, RouteError, RouteManager, RouteStatus, RouteStore};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Three collection points in a line: A(1) – B(2) – C(3).
fn network() -> NetworkSnapshot {
    let node = |id: u32, name: &str, lon: f64| Node {
        id:          NodeId(id),
        name:        name.to_owned(),
        coordinates: GeoPoint::new(4.8, 7.0 + lon),
    };
    NetworkSnapshot::new(
        vec![node(1, "A", 0.00), node(2, "B", 0.01), node(3, "C", 0.02)],
        vec![
            Edge { id: EdgeId(1), from_node: NodeId(1), to_node: NodeId(2), weight: 1.1 },
            Edge { id: EdgeId(2), from_node: NodeId(2), to_node: NodeId(3), weight: 1.1 },
        ],
    )
}

/// Starts at t = 1000 ms and moves 10 ms per reading.
fn manager() -> RouteManager<MemoryRouteStore, Arc<ManualClock>> {
    RouteManager::with_clock(MemoryRouteStore::new(), Arc::new(ManualClock::new(Timestamp(1_000), 10)))
}

fn draft(op: &str, created_at: i64) -> NewRoute {
    NewRoute {
        assigned_to:    OperatorId::from(op),
        nodes:          vec![NodeId(1), NodeId(2)],
        total_distance: 2.2,
        created_at:     Timestamp(created_at),
    }
}

// ── RouteStatus ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod status {
    use super::*;

    #[test]
    fn only_forward_single_steps_are_legal() {
        use RouteStatus::*;
        let all = [Pending, Active, Completed];
        for from in all {
            for to in all {
                let legal = matches!((from, to), (Pending, Active) | (Active, Completed));
                assert_eq!(from.can_transition_to(to), legal, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn completed_is_not_open() {
        assert!(RouteStatus::Pending.is_open());
        assert!(RouteStatus::Active.is_open());
        assert!(!RouteStatus::Completed.is_open());
    }

    #[test]
    fn parses_lowercase_names() {
        assert_eq!("active".parse::<RouteStatus>(), Ok(RouteStatus::Active));
        assert_eq!(" completed ".parse::<RouteStatus>(), Ok(RouteStatus::Completed));
        assert!("cancelled".parse::<RouteStatus>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&RouteStatus::Pending).unwrap(), "\"pending\"");
    }
}

// ── Lifecycle through the manager ─────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use super::*;

    #[test]
    fn three_stop_route_runs_pending_active_completed() {
        let mgr = manager();
        let net = network();

        let a = mgr.assign(OperatorId::from("op1"), &["A", "B", "C"], 2.2, &net).unwrap();
        let id = a.route.id;
        assert_eq!(a.route.status, RouteStatus::Pending);
        assert_eq!(a.route.nodes, vec![NodeId(1), NodeId(2), NodeId(3)]);
        assert_eq!(a.route.created_at, Timestamp(1_000));
        assert!(a.route.started_at.is_none() && a.route.completed_at.is_none());
        assert!(a.dropped.is_empty());

        let active = mgr.set_status(id, RouteStatus::Active).unwrap();
        assert_eq!(active.status, RouteStatus::Active);
        assert_eq!(active.started_at, Some(Timestamp(1_010)));
        assert!(active.completed_at.is_none());

        let done = mgr.set_status(id, RouteStatus::Completed).unwrap();
        assert_eq!(done.completed_at, Some(Timestamp(1_020)));
        assert_eq!(done.started_at, Some(Timestamp(1_010)));

        let err = mgr.set_status(id, RouteStatus::Active).unwrap_err();
        assert!(matches!(
            err,
            RouteError::InvalidTransition { from: RouteStatus::Completed, to: RouteStatus::Active, .. }
        ));
        // Rejected transitions leave the stored record alone.
        assert_eq!(mgr.route(id).unwrap(), done);
    }

    #[test]
    fn skipping_active_is_rejected() {
        let mgr = manager();
        let id = mgr.assign(OperatorId::from("op1"), &["A", "B"], 1.1, &network()).unwrap().route.id;
        assert!(matches!(
            mgr.complete(id),
            Err(RouteError::InvalidTransition { from: RouteStatus::Pending, .. })
        ));
        assert_eq!(mgr.route(id).unwrap().status, RouteStatus::Pending);
    }

    #[test]
    fn repeating_a_transition_is_rejected() {
        let mgr = manager();
        let id = mgr.assign(OperatorId::from("op1"), &["A", "B"], 1.1, &network()).unwrap().route.id;
        let first = mgr.start(id).unwrap();
        assert!(mgr.start(id).is_err());
        assert_eq!(mgr.route(id).unwrap().started_at, first.started_at);
    }

    #[test]
    fn unknown_route_is_not_found() {
        let mgr = manager();
        assert!(matches!(mgr.start(RouteId(42)), Err(RouteError::NotFound(RouteId(42)))));
    }

    #[test]
    fn unresolvable_names_are_dropped_in_order() {
        let mgr = manager();
        let a = mgr
            .assign(OperatorId::from("op1"), &["C", "Ghost", "A"], 2.2, &network())
            .unwrap();
        assert_eq!(a.route.nodes, vec![NodeId(3), NodeId(1)]);
        assert_eq!(a.dropped, vec!["Ghost".to_owned()]);
    }

    #[test]
    fn all_names_unresolvable_is_an_error() {
        let mgr = manager();
        let err = mgr.assign(OperatorId::from("op1"), &["X", "Y"], 0.0, &network()).unwrap_err();
        assert!(matches!(err, RouteError::NoResolvableNodes(2)));
        assert!(mgr.list_routes().unwrap().is_empty());
    }
}

// ── One open route per operator ───────────────────────────────────────────────

#[cfg(test)]
mod assignment_guard {
    use super::*;

    #[test]
    fn second_assignment_while_open_is_rejected() {
        let mgr = manager();
        let net = network();
        let op = OperatorId::from("op1");

        let first = mgr.assign(op.clone(), &["A", "B"], 1.1, &net).unwrap().route;
        let err = mgr.assign(op.clone(), &["B", "C"], 1.1, &net).unwrap_err();
        assert!(matches!(&err, RouteError::OperatorBusy { route, .. } if *route == first.id));

        mgr.start(first.id).unwrap();
        assert!(mgr.assign(op.clone(), &["B", "C"], 1.1, &net).is_err());

        mgr.complete(first.id).unwrap();
        let second = mgr.assign(op.clone(), &["B", "C"], 1.1, &net).unwrap().route;
        assert_ne!(second.id, first.id);
        assert_eq!(mgr.assigned_route(&op).unwrap(), Some(second));
    }

    #[test]
    fn other_operators_are_independent() {
        let mgr = manager();
        let net = network();
        mgr.assign(OperatorId::from("op1"), &["A"], 0.0, &net).unwrap();
        mgr.assign(OperatorId::from("op2"), &["A"], 0.0, &net).unwrap();
        assert_eq!(mgr.list_routes().unwrap().len(), 2);
    }

    #[test]
    fn concurrent_assignments_admit_exactly_one() {
        let mgr = Arc::new(manager());
        let net = Arc::new(network());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let mgr = Arc::clone(&mgr);
                let net = Arc::clone(&net);
                std::thread::spawn(move || mgr.assign(OperatorId::from("op1"), &["A", "B"], 1.1, &net))
            })
            .collect();
        let ok = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| r.is_ok())
            .count();

        assert_eq!(ok, 1);
        assert_eq!(mgr.list_routes().unwrap().len(), 1);
    }
}

// ── Queries ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod queries {
    use super::*;

    #[test]
    fn no_assigned_route_for_idle_operator() {
        let mgr = manager();
        assert!(mgr.assigned_route(&OperatorId::from("nobody")).unwrap().is_none());
    }

    #[test]
    fn completed_routes_are_newest_first_and_per_operator() {
        let mgr = manager();
        let net = network();
        let op = OperatorId::from("op1");

        let mut ids = Vec::new();
        for _ in 0..3 {
            let id = mgr.assign(op.clone(), &["A", "B"], 1.1, &net).unwrap().route.id;
            mgr.start(id).unwrap();
            mgr.complete(id).unwrap();
            ids.push(id);
        }
        mgr.assign(OperatorId::from("op2"), &["A"], 0.0, &net).unwrap();
        // Open route for op1 is not history.
        mgr.assign(op.clone(), &["C"], 0.0, &net).unwrap();

        let history: Vec<RouteId> = mgr.completed_routes(&op).unwrap().iter().map(|r| r.id).collect();
        ids.reverse();
        assert_eq!(history, ids);
    }

    #[test]
    fn list_is_newest_first() {
        let mgr = manager();
        let net = network();
        let a = mgr.assign(OperatorId::from("op1"), &["A"], 0.0, &net).unwrap().route.id;
        let b = mgr.assign(OperatorId::from("op2"), &["B"], 0.0, &net).unwrap().route.id;
        let listed: Vec<RouteId> = mgr.list_routes().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(listed, vec![b, a]);
    }

    #[test]
    fn route_serializes_camel_case() {
        let mgr = manager();
        let route = mgr.assign(OperatorId::from("op1"), &["A", "B"], 1.1, &network()).unwrap().route;
        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json["assignedTo"], "op1");
        assert_eq!(json["totalDistance"], 1.1);
        assert_eq!(json["status"], "pending");
        assert_eq!(json["nodes"], serde_json::json!([1, 2]));
        assert!(json["startedAt"].is_null());
    }
}

// ── MemoryRouteStore directly ─────────────────────────────────────────────────

#[cfg(test)]
mod memory_store {
    use super::*;

    #[test]
    fn ids_start_at_one_and_increase() {
        let store = MemoryRouteStore::new();
        assert_eq!(store.insert_if_idle(draft("op1", 5)).unwrap().id, RouteId(1));
        assert_eq!(store.insert_if_idle(draft("op2", 5)).unwrap().id, RouteId(2));
    }

    #[test]
    fn latest_open_prefers_newest_creation() {
        let store = MemoryRouteStore::new();
        let old = store.insert_if_idle(draft("op1", 5)).unwrap();
        store.transition(old.id, RouteStatus::Active, Timestamp(6)).unwrap();
        store.transition(old.id, RouteStatus::Completed, Timestamp(7)).unwrap();
        let new = store.insert_if_idle(draft("op1", 8)).unwrap();

        let open = store.latest_open(&OperatorId::from("op1")).unwrap().unwrap();
        assert_eq!(open.id, new.id);
    }
}

// ── SqliteRouteStore ──────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_store {
    use super::*;
    use crate::SqliteRouteStore;

    fn sqlite_manager() -> RouteManager<SqliteRouteStore, Arc<ManualClock>> {
        RouteManager::with_clock(
            SqliteRouteStore::open_in_memory().unwrap(),
            Arc::new(ManualClock::new(Timestamp(1_000), 10)),
        )
    }

    #[test]
    fn lifecycle_round_trips_through_sqlite() {
        let mgr = sqlite_manager();
        let a = mgr.assign(OperatorId::from("op1"), &["C", "A", "B"], 2.2, &network()).unwrap();
        let id = a.route.id;
        assert_eq!(id, RouteId(1));

        let stored = mgr.route(id).unwrap();
        assert_eq!(stored, a.route);
        assert_eq!(stored.nodes, vec![NodeId(3), NodeId(1), NodeId(2)]);

        mgr.start(id).unwrap();
        let done = mgr.complete(id).unwrap();
        assert_eq!(mgr.route(id).unwrap(), done);
        assert_eq!(done.started_at, Some(Timestamp(1_010)));
        assert_eq!(done.completed_at, Some(Timestamp(1_020)));
        assert!(mgr.start(id).is_err());
    }

    #[test]
    fn guard_holds_in_sqlite() {
        let mgr = sqlite_manager();
        let net = network();
        let op = OperatorId::from("op1");
        let first = mgr.assign(op.clone(), &["A"], 0.0, &net).unwrap().route;
        assert!(matches!(
            mgr.assign(op.clone(), &["B"], 0.0, &net),
            Err(RouteError::OperatorBusy { .. })
        ));
        mgr.start(first.id).unwrap();
        mgr.complete(first.id).unwrap();
        let second = mgr.assign(op.clone(), &["B"], 0.0, &net).unwrap().route;

        assert_eq!(mgr.assigned_route(&op).unwrap().map(|r| r.id), Some(second.id));
        assert_eq!(mgr.completed_routes(&op).unwrap().len(), 1);
        let listed: Vec<RouteId> = mgr.list_routes().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(listed, vec![second.id, first.id]);
    }

    #[test]
    fn get_reads_back_inserted_route() {
        let store = SqliteRouteStore::open_in_memory().unwrap();
        let inserted = store.insert_if_idle(draft("op1", 5)).unwrap();
        let fetched = store.get(inserted.id).unwrap().unwrap();
        assert_eq!(fetched, inserted);
        assert_eq!(fetched.nodes, vec![NodeId(1), NodeId(2)]);
    }

    #[test]
    fn missing_route_is_none() {
        let store = SqliteRouteStore::open_in_memory().unwrap();
        assert!(store.get(RouteId(9)).unwrap().is_none());
        assert!(matches!(
            store.transition(RouteId(9), RouteStatus::Active, Timestamp(1)),
            Err(RouteError::NotFound(_))
        ));
    }
}
