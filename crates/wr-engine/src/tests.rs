//! Unit tests for wr-engine.

use std::sync::Arc;

use wr_core::{EdgeId, GeoPoint, ManualClock, NodeId, OperatorId, RouteId, Timestamp};
use wr_graph::{Edge, GraphError, GraphResult, NetworkSnapshot, NetworkSource, Node};
use wr_hazard::{
    HazardError, HazardReport, HazardResult, HazardSource, ReportBook, ReportPriority, ReportStatus,
    WeatherSource, WeatherState,
};
use wr_route::{MemoryRouteStore, RouteStatus};

use crate::{
    AssignRouteRequest, ComputeRouteRequest, EngineConfig, EngineError, RouteEngine, StatusUpdateRequest,
    Weighting,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// The diamond network on the equator, ~1.1 km per 0.01°:
///
/// ```text
///   A ─1─ B ─5─ D
///    \    |    /
///     4   2   1
///      \  |  /
///         C
/// ```
fn diamond() -> NetworkSnapshot {
    let node = |id: u32, name: &str, lat: f64, lon: f64| Node {
        id:          NodeId(id),
        name:        name.to_owned(),
        coordinates: GeoPoint::new(lat, lon),
    };
    let edge = |id: u32, a: u32, b: u32, w: f64| Edge {
        id:        EdgeId(id),
        from_node: NodeId(a),
        to_node:   NodeId(b),
        weight:    w,
    };
    NetworkSnapshot::new(
        vec![
            node(1, "A", 0.0, 0.00),
            node(2, "B", 0.0, 0.05),
            node(3, "C", -0.05, 0.05),
            node(4, "D", 0.0, 0.10),
        ],
        vec![
            edge(1, 1, 2, 1.0),
            edge(2, 1, 3, 4.0),
            edge(3, 2, 3, 2.0),
            edge(4, 2, 4, 5.0),
            edge(5, 3, 4, 1.0),
        ],
    )
}

type TestEngine = RouteEngine<MemoryRouteStore, wr_graph::Dijkstra, Arc<ManualClock>>;

fn engine_with(weather: WeatherState, reports: Vec<HazardReport>) -> TestEngine {
    RouteEngine::builder(Arc::new(diamond()), MemoryRouteStore::new())
        .weather(Arc::new(weather))
        .hazards(Arc::new(ReportBook::new(reports)))
        .clock(Arc::new(ManualClock::new(Timestamp(0), 1)))
        .build()
        .unwrap()
}

fn engine() -> TestEngine {
    engine_with(WeatherState::clear(), Vec::new())
}

struct Unreachable;

impl WeatherSource for Unreachable {
    fn current(&self) -> HazardResult<WeatherState> {
        Err(HazardError::UpstreamUnavailable("connection refused".into()))
    }
}

impl HazardSource for Unreachable {
    fn open_hazards(&self) -> HazardResult<Vec<HazardReport>> {
        Err(HazardError::UpstreamUnavailable("report store offline".into()))
    }
}

struct BrokenNetwork;

impl NetworkSource for BrokenNetwork {
    fn snapshot(&self) -> GraphResult<NetworkSnapshot> {
        Err(GraphError::Parse("nodes.csv line 3: bad latitude".into()))
    }
}

// ── Requests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod requests {
    use super::*;

    #[test]
    fn compute_request_parses_scenario_graph() {
        let req = ComputeRouteRequest::from_json(
            r#"{"graph":{"A":{"B":1,"C":4},"B":{"A":1,"C":2,"D":5},"C":{"A":4,"B":2,"D":1},"D":{"B":5,"C":1}},
                "start":"A","end":"D"}"#,
        )
        .unwrap();
        assert_eq!(req.graph.weight("C", "D"), Some(1.0));
    }

    #[test]
    fn missing_field_is_validation_error() {
        let err = ComputeRouteRequest::from_json(r#"{"graph":{"A":{}},"start":"A"}"#).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn non_positive_weight_is_validation_error() {
        let err = ComputeRouteRequest::from_json(r#"{"graph":{"A":{"B":0},"B":{"A":0}},"start":"A","end":"B"}"#)
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn empty_graph_or_blank_endpoint_is_rejected() {
        assert!(ComputeRouteRequest::from_json(r#"{"graph":{},"start":"A","end":"B"}"#).is_err());
        assert!(ComputeRouteRequest::from_json(r#"{"graph":{"A":{}},"start":" ","end":"A"}"#).is_err());
    }

    #[test]
    fn assign_request_is_camel_case() {
        let req = AssignRouteRequest::from_json(
            r#"{"operatorId":"op1","nodeNames":["A","B","C"],"totalDistance":3.0}"#,
        )
        .unwrap();
        assert_eq!(req.operator_id, OperatorId::from("op1"));
        assert_eq!(req.node_names.len(), 3);
    }

    #[test]
    fn assign_request_rejects_bad_values() {
        for json in [
            r#"{"operatorId":"  ","nodeNames":["A"],"totalDistance":1.0}"#,
            r#"{"operatorId":"op1","nodeNames":[],"totalDistance":1.0}"#,
            r#"{"operatorId":"op1","nodeNames":["A"],"totalDistance":-1.0}"#,
            r#"{"operatorId":"op1","nodeNames":["A"]}"#,
        ] {
            assert!(
                matches!(AssignRouteRequest::from_json(json), Err(EngineError::Validation(_))),
                "{json}"
            );
        }
    }

    #[test]
    fn status_update_accepts_only_forward_targets() {
        let ok = StatusUpdateRequest::from_json(r#"{"routeId":7,"status":"active"}"#).unwrap();
        assert_eq!(ok.route_id, RouteId(7));
        assert_eq!(ok.target().unwrap(), RouteStatus::Active);

        assert!(StatusUpdateRequest::from_json(r#"{"routeId":7,"status":"pending"}"#).is_err());
        assert!(StatusUpdateRequest::from_json(r#"{"routeId":7,"status":"archived"}"#).is_err());
    }
}

// ── Config ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_object_is_all_defaults() {
        let cfg = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.reweight.wet_multiplier, 1.2);
        assert_eq!(cfg.weather.lat, 4.8156);
    }

    #[test]
    fn loads_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"reweight":{{"block_multiplier":3.0}},"weather":{{"api_key":"k"}}}}"#).unwrap();

        let cfg = EngineConfig::load(file.path()).unwrap();
        assert_eq!(cfg.reweight.block_multiplier, 3.0);
        assert_eq!(cfg.reweight.flood_multiplier, 1.5);
        assert_eq!(cfg.weather.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn discounting_multiplier_is_rejected() {
        let err = EngineConfig::from_json_str(r#"{"reweight":{"wet_multiplier":0.8}}"#).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = EngineConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let mut cfg = EngineConfig::default();
        cfg.reweight.hazard_radius_km = 0.0;
        let built = RouteEngine::builder(Arc::new(diamond()), MemoryRouteStore::new())
            .weather(Arc::new(WeatherState::clear()))
            .config(cfg)
            .build();
        assert!(matches!(built, Err(EngineError::Config(_))));
    }
}

// ── Computation ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod compute {
    use super::*;

    #[test]
    fn supplied_graph_scenario() {
        let req = ComputeRouteRequest::from_json(
            r#"{"graph":{"A":{"B":1,"C":4},"B":{"A":1,"C":2,"D":5},"C":{"A":4,"B":2,"D":1},"D":{"B":5,"C":1}},
                "start":"A","end":"D"}"#,
        )
        .unwrap();
        let res = engine().compute(&req).unwrap();
        assert_eq!(res.path, ["A", "B", "C", "D"]);
        assert!((res.total_distance - 4.0).abs() < 1e-6);
    }

    #[test]
    fn unknown_start_and_no_path_are_distinct() {
        let eng = engine();

        let mut req = ComputeRouteRequest::from_json(r#"{"graph":{"A":{"B":1},"B":{"A":1},"Z":{}},"start":"Q","end":"A"}"#)
            .unwrap();
        assert!(matches!(eng.compute(&req), Err(EngineError::UnknownNode(n)) if n == "Q"));

        req.start = "Z".into();
        assert!(matches!(eng.compute(&req), Err(EngineError::NoPath { .. })));
    }

    #[test]
    fn static_network_route() {
        let planned = engine().compute_between("A", "D", Weighting::Static).unwrap();
        assert_eq!(planned.path.path, ["A", "B", "C", "D"]);
        assert_eq!(planned.path.total_distance, 4.0);
        assert_eq!(planned.weather_multiplier, 1.0);
    }

    #[test]
    fn rain_scales_total_distance() {
        let eng = engine_with(WeatherState::new("Rain"), Vec::new());
        let planned = eng.compute_between("A", "D", Weighting::Dynamic).unwrap();
        assert_eq!(planned.path.path, ["A", "B", "C", "D"]);
        assert!((planned.path.total_distance - 4.8).abs() < 1e-9);
        assert_eq!(planned.weather_multiplier, 1.2);

        // Static searches ignore the weather.
        let dry = eng.compute_between("A", "D", Weighting::Static).unwrap();
        assert_eq!(dry.path.total_distance, 4.0);
    }

    #[test]
    fn road_block_diverts_route() {
        // Block at the B–C midpoint doubles B–C to 4, so A–C–D (5) beats
        // A–B–C–D (6).
        let block = HazardReport::new(
            "Road Block",
            GeoPoint::new(-0.025, 0.05),
            ReportStatus::Reviewing,
            ReportPriority::High,
        );
        let eng = engine_with(WeatherState::clear(), vec![block]);
        let planned = eng.compute_between("A", "D", Weighting::Dynamic).unwrap();
        assert_eq!(planned.path.path, ["A", "C", "D"]);
        assert_eq!(planned.path.total_distance, 5.0);
        assert_eq!(planned.hazards_applied, 1);
    }

    #[test]
    fn weighted_graph_keeps_base_intact() {
        let eng = engine_with(WeatherState::new("Drizzle"), Vec::new());
        let net = eng.weighted_graph().unwrap();
        assert_eq!(net.base.weight("A", "B"), Some(1.0));
        assert_eq!(net.weighted.graph.weight("A", "B"), Some(1.2));
        assert!(net.weighted.graph.is_symmetric());
        assert_eq!(net.stats.edges, 5);
        assert_eq!(net.weather.map(|w| w.main), Some("Drizzle".to_owned()));
    }

    #[test]
    fn upstream_failures_degrade_to_base_graph() {
        let eng = RouteEngine::builder(Arc::new(diamond()), MemoryRouteStore::new())
            .weather(Arc::new(Unreachable))
            .hazards(Arc::new(Unreachable))
            .build()
            .unwrap();
        let net = eng.weighted_graph().unwrap();
        assert!(net.weather.is_none());
        assert_eq!(net.weighted.graph, net.base);
        assert_eq!(net.weighted.weather_multiplier, 1.0);

        let planned = eng.compute_between("A", "D", Weighting::Dynamic).unwrap();
        assert_eq!(planned.path.total_distance, 4.0);
    }

    #[test]
    fn unreadable_network_is_surfaced() {
        let eng = RouteEngine::builder(Arc::new(BrokenNetwork), MemoryRouteStore::new())
            .weather(Arc::new(WeatherState::clear()))
            .build()
            .unwrap();
        assert!(matches!(eng.compute_between("A", "D", Weighting::Static), Err(EngineError::Network(_))));
    }

    #[test]
    fn unknown_network_node() {
        assert!(matches!(
            engine().compute_between("A", "Nowhere", Weighting::Dynamic),
            Err(EngineError::UnknownNode(n)) if n == "Nowhere"
        ));
    }
}

// ── Routes ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod routes {
    use super::*;

    fn assign_req(op: &str, names: &[&str], km: f64) -> AssignRouteRequest {
        AssignRouteRequest {
            operator_id:    OperatorId::from(op),
            node_names:     names.iter().map(|s| s.to_string()).collect(),
            total_distance: km,
        }
    }

    #[test]
    fn lifecycle_through_requests() {
        let eng = engine();
        let id = eng.assign(&assign_req("op1", &["A", "B", "C"], 3.0)).unwrap().route.id;

        let active = eng.set_status(&StatusUpdateRequest::new(id, "active")).unwrap();
        assert!(active.started_at.is_some());
        let done = eng.set_status(&StatusUpdateRequest::new(id, "completed")).unwrap();
        assert!(done.completed_at.is_some());

        let err = eng.set_status(&StatusUpdateRequest::new(id, "active")).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { from: RouteStatus::Completed, .. }));
        assert_eq!(eng.completed_routes(&OperatorId::from("op1")).unwrap().len(), 1);
    }

    #[test]
    fn unknown_route_and_bad_status() {
        let eng = engine();
        assert!(matches!(
            eng.set_status(&StatusUpdateRequest::new(RouteId(99), "active")),
            Err(EngineError::RouteNotFound(RouteId(99)))
        ));
        assert!(matches!(
            eng.set_status(&StatusUpdateRequest::new(RouteId(99), "paused")),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn busy_operator_is_reported() {
        let eng = engine();
        let first = eng.assign(&assign_req("op1", &["A", "B"], 1.0)).unwrap().route.id;
        let err = eng.assign(&assign_req("op1", &["C", "D"], 1.0)).unwrap_err();
        assert!(matches!(err, EngineError::OperatorBusy { route, .. } if route == first));
    }

    #[test]
    fn all_unknown_names_is_validation_error() {
        let err = engine().assign(&assign_req("op1", &["X", "Y"], 1.0)).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn dispatch_plans_and_persists() {
        let eng = engine();
        let a = eng.dispatch(OperatorId::from("op1"), "A", "D", Weighting::Dynamic).unwrap();
        assert_eq!(a.route.nodes, vec![NodeId(1), NodeId(2), NodeId(3), NodeId(4)]);
        assert_eq!(a.route.total_distance, 4.0);
        assert_eq!(a.route.status, RouteStatus::Pending);
    }

    #[test]
    fn assigned_route_view_resolves_stops() {
        let eng = engine();
        let op = OperatorId::from("op1");
        assert!(eng.assigned_route_view(&op).unwrap().is_none());

        let a = eng.assign(&assign_req("op1", &["D", "Ghost", "B"], 5.0)).unwrap();
        assert_eq!(a.dropped, vec!["Ghost".to_owned()]);

        let view = eng.assigned_route_view(&op).unwrap().unwrap();
        assert_eq!(view.route.id, a.route.id);
        let names: Vec<&str> = view.stops.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["D", "B"]);
        assert_eq!(view.stops[0].coordinates, GeoPoint::new(0.0, 0.10));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["assignedTo"], "op1");
        assert_eq!(json["stops"][1]["name"], "B");
    }

    #[test]
    fn list_routes_is_newest_first() {
        let eng = engine();
        let a = eng.assign(&assign_req("op1", &["A"], 0.0)).unwrap().route.id;
        let b = eng.assign(&assign_req("op2", &["B"], 0.0)).unwrap().route.id;
        let ids: Vec<RouteId> = eng.list_routes().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![b, a]);
    }
}
