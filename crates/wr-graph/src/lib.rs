//! `wr-graph`: collection-point graph, network loading, and routing.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                      |
//! |------------|---------------------------------------------------------------|
//! | [`model`]  | `Node`, `Edge`, `NetworkSnapshot`, `NodeCoords`               |
//! | [`graph`]  | `Graph` (name → neighbour → km), `build_graph`, `BuildStats`  |
//! | [`solver`] | `PathSolver` trait, `PathResult`, `Dijkstra`, `shortest_path` |
//! | [`source`] | `NetworkSource` trait, `CsvNetwork`                           |
//! | [`loader`] | `load_network_csv`, `load_network_readers`                    |
//! | [`error`]  | `GraphError`, `GraphResult<T>`                                |
//!
//! The graph is keyed by node **name**; persisted records reference nodes by
//! [`NodeId`](wr_core::NodeId).  [`NetworkSnapshot`] carries both so callers
//! can translate in either direction.

pub mod error;
pub mod graph;
pub mod loader;
pub mod model;
pub mod solver;
pub mod source;


pub use error::{GraphError, GraphResult};
pub use graph::{BuildStats, Graph, build_graph, round_weight};
pub use loader::{load_network_csv, load_network_readers};
pub use model::{Edge, NetworkSnapshot, Node, NodeCoords};
pub use solver::{Dijkstra, PathResult, PathSolver, shortest_path};
pub use source::{CsvNetwork, NetworkSource};
