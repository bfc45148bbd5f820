//! wasteroute: plan, assign and track waste-collection routes from the
//! command line.
//!
//! The network is read from two CSV files (`nodes.csv`, `edges.csv`), open
//! hazard reports from an optional JSON file, and routes are kept in an
//! SQLite database so successive invocations share state:
//!
//! ```text
//! wasteroute --nodes data/nodes.csv --edges data/edges.csv --hazards data/hazards.json \
//!     dispatch --operator op1 --start Depot --end "Mile One"
//! wasteroute ... status --route 1 --to active
//! wasteroute ... route --operator op1
//! ```
//!
//! Results are printed to stdout as JSON; logs go to stderr (`RUST_LOG`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wr_core::{OperatorId, RouteId};
use wr_engine::{
    AssignRouteRequest, ComputeRouteRequest, EngineConfig, RouteEngine, StatusUpdateRequest, Weighting,
};
use wr_graph::CsvNetwork;
use wr_hazard::{HazardReport, ReportBook, WeatherState};
use wr_route::{Assignment, SqliteRouteStore};

#[derive(Debug, Parser)]
#[command(name = "wasteroute", version, about = "Adaptive waste-collection routing")]
struct Cli {
    /// Collection points: `id,name,lat,lon`.
    #[arg(long, default_value = "data/nodes.csv")]
    nodes: PathBuf,

    /// Road segments: `id,from,to,weight`.
    #[arg(long, default_value = "data/edges.csv")]
    edges: PathBuf,

    /// JSON array of citizen hazard reports.
    #[arg(long)]
    hazards: Option<PathBuf>,

    /// Engine configuration (JSON).  Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fixed weather condition (e.g. "Rain") instead of querying OpenWeatherMap.
    #[arg(long)]
    weather: Option<String>,

    /// Route database.
    #[arg(long, default_value = "routes.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Shortest path on a graph supplied as a JSON request file.
    Compute {
        #[arg(long)]
        request: PathBuf,
    },
    /// Shortest path between two collection points of the network.
    Plan {
        #[arg(long)]
        start:  String,
        #[arg(long)]
        end:    String,
        /// Ignore weather and hazards.
        #[arg(long = "static")]
        static_weights: bool,
    },
    /// Print the base and weighted graphs.
    Graph,
    /// Assign an explicit list of stops to an operator.
    Assign {
        #[arg(long)]
        operator: String,
        #[arg(long, num_args = 1.., required = true)]
        nodes:    Vec<String>,
        #[arg(long)]
        distance: f64,
    },
    /// Plan a route and assign it to an operator.
    Dispatch {
        #[arg(long)]
        operator: String,
        #[arg(long)]
        start:    String,
        #[arg(long)]
        end:      String,
        #[arg(long = "static")]
        static_weights: bool,
    },
    /// Move a route to `active` or `completed`.
    Status {
        #[arg(long)]
        route: u64,
        #[arg(long)]
        to:    String,
    },
    /// The operator's current route with its stops.
    Route {
        #[arg(long)]
        operator: String,
    },
    /// The operator's completed routes.
    History {
        #[arg(long)]
        operator: String,
    },
    /// Every route, newest first.
    List,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let engine = build_engine(&cli)?;

    match cli.command {
        Command::Compute { request } => {
            let text = std::fs::read_to_string(&request)
                .with_context(|| format!("reading {}", request.display()))?;
            let req = ComputeRouteRequest::from_json(&text)?;
            print_json(&engine.compute(&req)?)
        }
        Command::Plan { start, end, static_weights } => {
            print_json(&engine.compute_between(&start, &end, weighting(static_weights))?)
        }
        Command::Graph => {
            let net = engine.weighted_graph()?;
            info!(
                nodes   = net.stats.nodes,
                edges   = net.stats.edges,
                skipped = net.stats.skipped(),
                "network loaded"
            );
            print_json(&serde_json::json!({
                "base":              net.base,
                "weighted":          net.weighted.graph,
                "weatherMultiplier": net.weighted.weather_multiplier,
                "hazardsApplied":    net.weighted.hazards_applied,
                "weather":           net.weather,
            }))
        }
        Command::Assign { operator, nodes, distance } => {
            let req = AssignRouteRequest {
                operator_id:    OperatorId::new(operator),
                node_names:     nodes,
                total_distance: distance,
            };
            print_assignment(engine.assign(&req)?)
        }
        Command::Dispatch { operator, start, end, static_weights } => print_assignment(engine.dispatch(
            OperatorId::new(operator),
            &start,
            &end,
            weighting(static_weights),
        )?),
        Command::Status { route, to } => {
            print_json(&engine.set_status(&StatusUpdateRequest::new(RouteId(route), to))?)
        }
        Command::Route { operator } => print_json(&engine.assigned_route_view(&OperatorId::new(operator))?),
        Command::History { operator } => print_json(&engine.completed_routes(&OperatorId::new(operator))?),
        Command::List => print_json(&engine.list_routes()?),
    }
}

fn build_engine(cli: &Cli) -> Result<RouteEngine<SqliteRouteStore>> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let store = SqliteRouteStore::open(&cli.db)
        .with_context(|| format!("opening route database {}", cli.db.display()))?;

    let mut builder = RouteEngine::builder(Arc::new(CsvNetwork::new(&cli.nodes, &cli.edges)), store)
        .config(config)
        .hazards(Arc::new(ReportBook::new(load_hazards(cli.hazards.as_deref())?)));
    if let Some(main) = &cli.weather {
        builder = builder.weather(Arc::new(WeatherState::new(main.as_str())));
    }
    Ok(builder.build()?)
}

fn load_hazards(path: Option<&Path>) -> Result<Vec<HazardReport>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let reports: Vec<HazardReport> =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    info!(count = reports.len(), path = %path.display(), "loaded hazard reports");
    Ok(reports)
}

fn weighting(static_weights: bool) -> Weighting {
    if static_weights { Weighting::Static } else { Weighting::Dynamic }
}

fn print_assignment(a: Assignment) -> Result<()> {
    print_json(&serde_json::json!({ "route": a.route, "dropped": a.dropped }))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
