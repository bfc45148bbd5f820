//! Stored network records as supplied by the node/edge store.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use wr_core::{EdgeId, GeoPoint, NodeId};

use crate::graph::{BuildStats, Graph, build_graph};

/// Coordinates keyed by node name, the lookup the reweighter needs to place
/// an edge on the map.
pub type NodeCoords = BTreeMap<String, GeoPoint>;

/// A named collection point.  Names are unique across the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id:          NodeId,
    pub name:        String,
    pub coordinates: GeoPoint,
}

/// An undirected road segment, stored once and used in both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id:        EdgeId,
    pub from_node: NodeId,
    pub to_node:   NodeId,
    /// Static base distance in kilometres.
    pub weight:    f64,
}

/// Every node and edge the store held at the moment it was read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl NetworkSnapshot {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// Build the base graph for this snapshot.
    pub fn build_graph(&self) -> (Graph, BuildStats) {
        build_graph(&self.nodes, &self.edges)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn coords_by_name(&self) -> NodeCoords {
        self.nodes
            .iter()
            .map(|n| (n.name.clone(), n.coordinates))
            .collect()
    }

    /// Translate node names (in path order) to ids.
    ///
    /// Names with no matching node are dropped and returned separately so the
    /// caller can report them; the relative order of the rest is preserved.
    pub fn resolve_names<S: AsRef<str>>(&self, names: &[S]) -> (Vec<NodeId>, Vec<String>) {
        let by_name: HashMap<&str, NodeId> =
            self.nodes.iter().map(|n| (n.name.as_str(), n.id)).collect();

        let mut ids     = Vec::with_capacity(names.len());
        let mut dropped = Vec::new();
        for name in names {
            match by_name.get(name.as_ref()) {
                Some(&id) => ids.push(id),
                None => {
                    debug!(name = name.as_ref(), "dropping unresolved node name");
                    dropped.push(name.as_ref().to_owned());
                }
            }
        }
        (ids, dropped)
    }
}
