//! `wr-engine`: the adaptive route optimization engine.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                        |
//! |-------------|-----------------------------------------------------------------|
//! | [`engine`]  | `RouteEngine<S, P, C>`, `EngineBuilder`, `Weighting`, views     |
//! | [`request`] | `ComputeRouteRequest`, `AssignRouteRequest`, `StatusUpdateRequest` |
//! | [`config`]  | `EngineConfig` (JSON)                                           |
//! | [`error`]   | `EngineError`, `EngineResult<T>`                                |
//!
//! # Request flow
//!
//! ```text
//! NetworkSource ──► build_graph ──► Reweighter (weather, hazards) ──► PathSolver
//!                                                                        │
//!                                 RouteManager::assign ◄── path, km ─────┘
//! ```
//!
//! The weather and hazard sources are best effort.  When either fails the
//! engine logs a warning and reweights without it.

pub mod config;
pub mod engine;
pub mod error;
pub mod request;

#[cfg(test)]
mod tests;

pub use config::EngineConfig;
pub use engine::{EngineBuilder, PlannedRoute, RouteEngine, RouteView, Stop, WeightedNetwork, Weighting};
pub use error::{EngineError, EngineResult};
pub use request::{AssignRouteRequest, ComputeRouteRequest, StatusUpdateRequest};
