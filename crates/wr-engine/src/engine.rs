//! [`RouteEngine`]: network → reweight → solve → assign.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use wr_core::{Clock, GeoPoint, NodeId, OperatorId, SystemClock};
use wr_graph::{BuildStats, Dijkstra, Graph, NetworkSnapshot, NetworkSource, PathResult, PathSolver};
use wr_hazard::{
    HazardSource, NoHazards, OpenWeatherClient, Reweighted, Reweighter, WeatherSource, WeatherState,
};
use wr_route::{Assignment, Route, RouteManager, RouteStore};

use crate::{
    AssignRouteRequest, ComputeRouteRequest, EngineConfig, EngineError, EngineResult,
    StatusUpdateRequest,
};

/// Whether a network route search uses live conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Weighting {
    /// Stored base distances only.
    Static,
    /// Weather and hazard multipliers applied.
    #[default]
    Dynamic,
}

/// Everything [`RouteEngine::weighted_graph`] read and derived for one request.
#[derive(Debug, Clone)]
pub struct WeightedNetwork {
    pub snapshot: NetworkSnapshot,
    pub base:     Graph,
    pub stats:    BuildStats,
    pub weighted: Reweighted,
    /// `None` when the weather source could not be reached.
    pub weather:  Option<WeatherState>,
}

/// A path found on the stored network.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedRoute {
    #[serde(flatten)]
    pub path:               PathResult,
    pub weather_multiplier: f64,
    pub hazards_applied:    usize,
}

/// One stop of an assigned route, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    pub id:          NodeId,
    pub name:        String,
    pub coordinates: GeoPoint,
}

/// An operator's current route with its stops resolved against the network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteView {
    #[serde(flatten)]
    pub route: Route,
    pub stops: Vec<Stop>,
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Fluent builder for [`RouteEngine<S, P, C>`].
///
/// # Required inputs
///
/// - `network`: the node/edge store
/// - `S: RouteStore`, where routes are kept
///
/// # Optional inputs (have defaults)
///
/// | Method          | Default                                          |
/// |-----------------|--------------------------------------------------|
/// | `.config(c)`    | `EngineConfig::default()`                        |
/// | `.weather(w)`   | `OpenWeatherClient` built from `config.weather`  |
/// | `.hazards(h)`   | [`NoHazards`]                                    |
/// | `.solver(p)`    | [`Dijkstra`]                                     |
/// | `.clock(c)`     | [`SystemClock`]                                  |
///
/// ```rust,ignore
/// let engine = RouteEngine::builder(Arc::new(snapshot), MemoryRouteStore::new())
///     .config(EngineConfig::load(path)?)
///     .hazards(Arc::new(ReportBook::new(reports)))
///     .build()?;
/// ```
pub struct EngineBuilder<S: RouteStore, P: PathSolver = Dijkstra, C: Clock = SystemClock> {
    network: Arc<dyn NetworkSource>,
    store:   S,
    solver:  P,
    clock:   C,
    config:  EngineConfig,
    weather: Option<Arc<dyn WeatherSource>>,
    hazards: Option<Arc<dyn HazardSource>>,
}

impl<S: RouteStore, P: PathSolver, C: Clock> EngineBuilder<S, P, C> {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Use `weather` instead of contacting OpenWeatherMap.
    pub fn weather(mut self, weather: Arc<dyn WeatherSource>) -> Self {
        self.weather = Some(weather);
        self
    }

    pub fn hazards(mut self, hazards: Arc<dyn HazardSource>) -> Self {
        self.hazards = Some(hazards);
        self
    }

    pub fn solver<Q: PathSolver>(self, solver: Q) -> EngineBuilder<S, Q, C> {
        EngineBuilder {
            network: self.network,
            store:   self.store,
            solver,
            clock:   self.clock,
            config:  self.config,
            weather: self.weather,
            hazards: self.hazards,
        }
    }

    pub fn clock<D: Clock>(self, clock: D) -> EngineBuilder<S, P, D> {
        EngineBuilder {
            network: self.network,
            store:   self.store,
            solver:  self.solver,
            clock,
            config:  self.config,
            weather: self.weather,
            hazards: self.hazards,
        }
    }

    /// Validate the configuration and assemble the engine.
    pub fn build(self) -> EngineResult<RouteEngine<S, P, C>> {
        self.config.validate()?;
        let reweighter = Reweighter::new(self.config.reweight)?;

        let weather = match self.weather {
            Some(w) => w,
            None => {
                let client = OpenWeatherClient::new(self.config.weather.clone())?;
                if client.is_mock() {
                    info!("no OpenWeatherMap API key configured; serving mock weather");
                }
                Arc::new(client)
            }
        };

        Ok(RouteEngine {
            network: self.network,
            weather,
            hazards: self.hazards.unwrap_or_else(|| Arc::new(NoHazards)),
            reweighter,
            solver:  self.solver,
            routes:  RouteManager::with_clock(self.store, self.clock),
        })
    }
}

// ── RouteEngine ───────────────────────────────────────────────────────────────

/// Ties the graph, hazard and route crates together behind typed requests.
///
/// Holds no per-request state: every call re-reads the network, the weather
/// and the open hazards, so concurrent calls do not interact except through
/// the route store.
pub struct RouteEngine<S: RouteStore, P: PathSolver = Dijkstra, C: Clock = SystemClock> {
    network:    Arc<dyn NetworkSource>,
    weather:    Arc<dyn WeatherSource>,
    hazards:    Arc<dyn HazardSource>,
    reweighter: Reweighter,
    solver:     P,
    routes:     RouteManager<S, C>,
}

impl<S: RouteStore> RouteEngine<S> {
    pub fn builder(network: Arc<dyn NetworkSource>, store: S) -> EngineBuilder<S> {
        EngineBuilder {
            network,
            store,
            solver:  Dijkstra,
            clock:   SystemClock,
            config:  EngineConfig::default(),
            weather: None,
            hazards: None,
        }
    }
}

impl<S: RouteStore, P: PathSolver, C: Clock> RouteEngine<S, P, C> {
    pub fn routes(&self) -> &RouteManager<S, C> {
        &self.routes
    }

    pub fn reweighter(&self) -> &Reweighter {
        &self.reweighter
    }

    /// Shortest path on a caller-supplied graph.
    ///
    /// # Errors
    ///
    /// `Validation`, `UnknownNode` or `NoPath`.
    pub fn compute(&self, req: &ComputeRouteRequest) -> EngineResult<PathResult> {
        req.validate()?;
        let result = self.solver.solve(&req.graph, &req.start, &req.end)?;
        debug!(start = %req.start, end = %req.end, km = result.total_distance, "computed route");
        Ok(result)
    }

    /// Read the network and produce its base and weighted graphs.
    ///
    /// A failing weather source counts as dry weather and a failing hazard
    /// source as no hazards; both are logged at `warn`.  Only a failure to
    /// read the network itself is returned.
    pub fn weighted_graph(&self) -> EngineResult<WeightedNetwork> {
        let snapshot = self.network.snapshot()?;
        let (base, stats) = snapshot.build_graph();

        let weather = match self.weather.current() {
            Ok(w) => Some(w),
            Err(e) => {
                warn!(error = %e, "weather source unavailable; no weather penalty applied");
                None
            }
        };
        let reports = match self.hazards.open_hazards() {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "hazard source unavailable; no hazard penalties applied");
                Vec::new()
            }
        };

        let weighted = self
            .reweighter
            .apply(&base, &snapshot.coords_by_name(), weather.as_ref(), &reports);

        Ok(WeightedNetwork { snapshot, base, stats, weighted, weather })
    }

    /// Shortest path between two named nodes of the stored network.
    pub fn compute_between(&self, start: &str, end: &str, weighting: Weighting) -> EngineResult<PlannedRoute> {
        if start.trim().is_empty() || end.trim().is_empty() {
            return Err(EngineError::Validation("start and end must be non-empty node names".into()));
        }

        let (path, weather_multiplier, hazards_applied) = match weighting {
            Weighting::Static => {
                let (base, _) = self.network.snapshot()?.build_graph();
                (self.solver.solve(&base, start, end)?, 1.0, 0)
            }
            Weighting::Dynamic => {
                let net = self.weighted_graph()?;
                let w = net.weighted;
                (self.solver.solve(&w.graph, start, end)?, w.weather_multiplier, w.hazards_applied)
            }
        };

        info!(start, end, ?weighting, km = path.total_distance, stops = path.path.len(), "planned route");
        Ok(PlannedRoute { path, weather_multiplier, hazards_applied })
    }

    /// Persist a route for an operator.
    ///
    /// # Errors
    ///
    /// `Validation` for a malformed request or when no name resolves,
    /// `OperatorBusy` when the operator still has an open route.
    pub fn assign(&self, req: &AssignRouteRequest) -> EngineResult<Assignment> {
        req.validate()?;
        let snapshot = self.network.snapshot()?;
        let assignment = self.routes.assign(
            req.operator_id.clone(),
            req.node_names.as_slice(),
            req.total_distance,
            &snapshot,
        )?;
        if !assignment.dropped.is_empty() {
            warn!(
                route   = %assignment.route.id,
                dropped = ?assignment.dropped,
                "assigned route omits unknown node names"
            );
        }
        Ok(assignment)
    }

    /// Plan a route on the live network and assign it in one step.
    pub fn dispatch(
        &self,
        operator:  OperatorId,
        start:     &str,
        end:       &str,
        weighting: Weighting,
    ) -> EngineResult<Assignment> {
        let planned = self.compute_between(start, end, weighting)?;
        self.assign(&AssignRouteRequest {
            operator_id:    operator,
            node_names:     planned.path.path,
            total_distance: planned.path.total_distance,
        })
    }

    pub fn set_status(&self, req: &StatusUpdateRequest) -> EngineResult<Route> {
        let status = req.target()?;
        Ok(self.routes.set_status(req.route_id, status)?)
    }

    /// The operator's current route with each stop's name and coordinates.
    ///
    /// Stops whose node has since disappeared from the network are left out
    /// of `stops` (the route's `nodes` list is unchanged).
    pub fn assigned_route_view(&self, operator: &OperatorId) -> EngineResult<Option<RouteView>> {
        let Some(route) = self.routes.assigned_route(operator)? else {
            return Ok(None);
        };
        let snapshot = self.network.snapshot()?;

        let stops: Vec<Stop> = route
            .nodes
            .iter()
            .filter_map(|&id| {
                let node = snapshot.node(id);
                if node.is_none() {
                    warn!(route = %route.id, node = %id, "route stop no longer in network");
                }
                node.map(|n| Stop { id: n.id, name: n.name.clone(), coordinates: n.coordinates })
            })
            .collect();

        Ok(Some(RouteView { route, stops }))
    }

    pub fn completed_routes(&self, operator: &OperatorId) -> EngineResult<Vec<Route>> {
        Ok(self.routes.completed_routes(operator)?)
    }

    pub fn list_routes(&self) -> EngineResult<Vec<Route>> {
        Ok(self.routes.list_routes()?)
    }
}
