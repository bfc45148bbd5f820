//! Shortest-path trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! `wr-engine` calls routing via the [`PathSolver`] trait so an application
//! can swap in A* or a turn-aware search without touching the engine.  The
//! default [`Dijkstra`] is a binary-heap implementation, O((V + E) log V).
//!
//! # Cost units
//!
//! Costs are whatever the graph holds (kilometres, possibly penalised).  The
//! reported total is re-summed along the returned path from the **same**
//! graph that was searched, so it always reflects the weighting in effect.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Graph, GraphError, GraphResult};

// ── PathResult ────────────────────────────────────────────────────────────────

/// The result of a shortest-path query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathResult {
    /// Node names from start to end, inclusive.
    pub path: Vec<String>,
    /// Sum of edge weights along `path`.
    pub total_distance: f64,
}

impl PathResult {
    /// `true` if start and end are the same node.
    pub fn is_trivial(&self) -> bool {
        self.path.len() <= 1
    }

    /// Consecutive `(from, to)` pairs along the path.
    pub fn legs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.path.windows(2).map(|w| (w[0].as_str(), w[1].as_str()))
    }
}

// ── PathSolver trait ──────────────────────────────────────────────────────────

/// Pluggable shortest-path engine.
///
/// Implementations must be `Send + Sync`; route computations for different
/// operators may run on different threads against their own graphs.
pub trait PathSolver: Send + Sync {
    /// Find a least-cost path from `start` to `end`.
    ///
    /// # Errors
    ///
    /// - [`GraphError::UnknownNode`] if either name is not a key of `graph`.
    /// - [`GraphError::NoPath`] if the two are in different components.
    fn solve(&self, graph: &Graph, start: &str, end: &str) -> GraphResult<PathResult>;
}

// ── Dijkstra ──────────────────────────────────────────────────────────────────

/// Standard Dijkstra over the name-keyed adjacency map.
///
/// Names are interned to dense indices first (keys in sorted order, then any
/// neighbour that is not itself a key).  The heap breaks cost ties on that
/// index, so a fixed graph always yields the same path.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dijkstra;

impl PathSolver for Dijkstra {
    fn solve(&self, graph: &Graph, start: &str, end: &str) -> GraphResult<PathResult> {
        shortest_path(graph, start, end)
    }
}

/// Heap key: an `f64` with a total order.  Weights are validated positive
/// before they reach the solver, so NaN never shows up in practice.
#[derive(Copy, Clone, Debug)]
struct Cost(f64);

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Run Dijkstra on `graph` from `start` to `end`.
pub fn shortest_path(graph: &Graph, start: &str, end: &str) -> GraphResult<PathResult> {
    if !graph.contains(start) {
        return Err(GraphError::UnknownNode(start.to_owned()));
    }
    if !graph.contains(end) {
        return Err(GraphError::UnknownNode(end.to_owned()));
    }
    if start == end {
        return Ok(PathResult { path: vec![start.to_owned()], total_distance: 0.0 });
    }

    // ── Intern names ──────────────────────────────────────────────────────
    let mut names: Vec<&str> = graph.node_names().collect();
    let mut index: HashMap<&str, usize> =
        names.iter().enumerate().map(|(i, &n)| (n, i)).collect();
    for (_, b, _) in graph.entries() {
        if !index.contains_key(b) {
            index.insert(b, names.len());
            names.push(b);
        }
    }

    let n        = names.len();
    let from     = index[start];
    let to       = index[end];
    // dist[v] = best known cost to reach v.
    let mut dist = vec![f64::INFINITY; n];
    // prev[v] = predecessor on the best known path; None for unreached nodes.
    let mut prev: Vec<Option<usize>> = vec![None; n];

    dist[from] = 0.0;

    // Min-heap via Reverse; secondary key (index) makes ties deterministic.
    let mut heap: BinaryHeap<Reverse<(Cost, usize)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(0.0), from)));

    while let Some(Reverse((Cost(cost), node))) = heap.pop() {
        if node == to {
            break;
        }
        // Skip stale heap entries.
        if cost > dist[node] {
            continue;
        }
        let Some(nbrs) = graph.neighbors(names[node]) else {
            continue;
        };
        for (nb, &w) in nbrs {
            let v = index[nb.as_str()];
            let new_cost = cost + w;
            if new_cost < dist[v] {
                dist[v] = new_cost;
                prev[v] = Some(node);
                heap.push(Reverse((Cost(new_cost), v)));
            }
        }
    }

    if prev[to].is_none() {
        debug!(start, end, "no path between nodes");
        return Err(GraphError::NoPath { from: start.to_owned(), to: end.to_owned() });
    }

    let path = reconstruct(&names, &prev, to);
    let total_distance = path
        .windows(2)
        // Every leg was relaxed from this graph, so the entry is always present.
        .map(|w| graph.weight(&w[0], &w[1]).unwrap_or(0.0))
        .sum();

    debug!(start, end, hops = path.len() - 1, total_distance, "shortest path found");
    Ok(PathResult { path, total_distance })
}

fn reconstruct(names: &[&str], prev: &[Option<usize>], to: usize) -> Vec<String> {
    let mut path = vec![names[to].to_owned()];
    let mut cur = to;
    while let Some(p) = prev[cur] {
        path.push(names[p].to_owned());
        cur = p;
    }
    path.reverse();
    path
}
