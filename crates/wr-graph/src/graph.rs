//! The weighted adjacency map and its builder.
//!
//! # Data layout
//!
//! `Graph` is `BTreeMap<name, BTreeMap<neighbour, km>>`.  Ordered maps make
//! iteration order a function of the contents alone, so two graphs built from
//! the same records compare equal and serialize to identical JSON no matter
//! what order the records arrived in.
//!
//! Every node gets a key even when it has no edges.  An absent key means
//! "unknown node"; a present key with an empty map means "isolated node".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use wr_core::NodeId;

use crate::model::{Edge, Node};
use crate::{GraphError, GraphResult};

// ── Graph ─────────────────────────────────────────────────────────────────────

/// Undirected weighted graph keyed by node name.
///
/// Symmetry (`w(a, b) == w(b, a)`) is maintained by every mutating method
/// here.  A graph deserialized from a request is taken as given and may be
/// asymmetric; the solver then follows the directed entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Graph {
    adj: BTreeMap<String, BTreeMap<String, f64>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `name` is a key.  No-op if it already is.
    pub fn add_node(&mut self, name: impl Into<String>) {
        self.adj.entry(name.into()).or_default();
    }

    /// Set `w(a, b)` and `w(b, a)` to `weight`, adding either node if missing.
    pub fn insert_edge(&mut self, a: &str, b: &str, weight: f64) {
        self.adj.entry(a.to_owned()).or_default().insert(b.to_owned(), weight);
        self.adj.entry(b.to_owned()).or_default().insert(a.to_owned(), weight);
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.adj.contains_key(name)
    }

    /// Weight of the directed entry `a → b`.
    #[inline]
    pub fn weight(&self, a: &str, b: &str) -> Option<f64> {
        self.adj.get(a).and_then(|n| n.get(b)).copied()
    }

    pub fn neighbors(&self, name: &str) -> Option<&BTreeMap<String, f64>> {
        self.adj.get(name)
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.adj.keys().map(String::as_str)
    }

    pub fn node_count(&self) -> usize {
        self.adj.len()
    }

    /// Number of undirected edges (pairs with `a <= b`).
    pub fn edge_count(&self) -> usize {
        self.edge_pairs().count()
    }

    pub fn is_empty(&self) -> bool {
        self.adj.is_empty()
    }

    /// Every directed entry `(a, b, w)` in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.adj.iter().flat_map(|(a, nbrs)| {
            nbrs.iter().map(move |(b, &w)| (a.as_str(), b.as_str(), w))
        })
    }

    /// Each undirected edge exactly once, as `(a, b, w)` with `a <= b`.
    pub fn edge_pairs(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.entries().filter(|(a, b, _)| a <= b)
    }

    pub fn is_symmetric(&self) -> bool {
        self.entries().all(|(a, b, w)| self.weight(b, a) == Some(w))
    }

    /// Apply `f` to every directed entry.
    pub fn map_weights(&mut self, mut f: impl FnMut(f64) -> f64) {
        for nbrs in self.adj.values_mut() {
            for w in nbrs.values_mut() {
                *w = f(*w);
            }
        }
    }

    /// Multiply both directions of edge `a–b` by `factor`, rounding each to
    /// `decimals` places.  Returns `false` if either direction is missing.
    pub fn scale_edge(&mut self, a: &str, b: &str, factor: f64, decimals: u32) -> bool {
        if self.weight(a, b).is_none() || self.weight(b, a).is_none() {
            return false;
        }
        for (x, y) in [(a, b), (b, a)] {
            if let Some(w) = self.adj.get_mut(x).and_then(|n| n.get_mut(y)) {
                *w = round_weight(*w * factor, decimals);
            }
        }
        true
    }

    /// Reject any entry whose weight is NaN, infinite, or `<= 0`.
    pub fn validate(&self) -> GraphResult<()> {
        match self.entries().find(|&(_, _, w)| !(w.is_finite() && w > 0.0)) {
            Some((a, b, w)) => Err(GraphError::InvalidWeight {
                from:   a.to_owned(),
                to:     b.to_owned(),
                weight: w,
            }),
            None => Ok(()),
        }
    }
}

/// Round `x` to `decimals` decimal places (half away from zero).
#[inline]
pub fn round_weight(x: f64, decimals: u32) -> f64 {
    let p = 10f64.powi(decimals as i32);
    (x * p).round() / p
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// What [`build_graph`] kept and what it skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub nodes:           usize,
    /// Edge records that made it into the graph, duplicates included.
    pub edges:           usize,
    /// Edges with an endpoint id that matches no node.
    pub unresolved:      usize,
    /// Edges whose weight is NaN, infinite, or `<= 0`.
    pub invalid_weight:  usize,
    /// Edges that repeated an already-connected pair.
    pub duplicates:      usize,
}

impl BuildStats {
    pub fn skipped(&self) -> usize {
        self.unresolved + self.invalid_weight
    }
}

/// Assemble the base graph from stored nodes and edges.
///
/// - Every node name becomes a key, isolated or not.
/// - Edges whose endpoints do not resolve, or whose weight is not a positive
///   finite number, are skipped and counted.
/// - When two edges connect the same pair, the smaller weight wins so the
///   result does not depend on record order.
pub fn build_graph(nodes: &[Node], edges: &[Edge]) -> (Graph, BuildStats) {
    let id_to_name: BTreeMap<NodeId, &str> =
        nodes.iter().map(|n| (n.id, n.name.as_str())).collect();

    let mut graph = Graph::new();
    let mut stats = BuildStats::default();

    for n in nodes {
        graph.add_node(n.name.as_str());
    }
    stats.nodes = graph.node_count();

    for e in edges {
        let (Some(&a), Some(&b)) = (id_to_name.get(&e.from_node), id_to_name.get(&e.to_node)) else {
            debug!(edge = %e.id, from = %e.from_node, to = %e.to_node, "skipping edge with unresolved endpoint");
            stats.unresolved += 1;
            continue;
        };
        if !(e.weight.is_finite() && e.weight > 0.0) {
            debug!(edge = %e.id, weight = e.weight, "skipping edge with invalid weight");
            stats.invalid_weight += 1;
            continue;
        }

        let weight = match graph.weight(a, b) {
            Some(existing) => {
                stats.duplicates += 1;
                existing.min(e.weight)
            }
            None => e.weight,
        };
        graph.insert_edge(a, b, weight);
        stats.edges += 1;
    }

    if stats.skipped() > 0 {
        warn!(
            unresolved = stats.unresolved,
            invalid_weight = stats.invalid_weight,
            "skipped edges while building graph"
        );
    }
    debug!(nodes = stats.nodes, edges = stats.edges, "built base graph");

    (graph, stats)
}
