//! CSV network loader.
//!
//! # CSV format
//!
//! Two files.  Nodes:
//!
//! ```csv
//! id,name,lat,lon
//! 0,Depot,4.8156,7.0498
//! 1,Market,4.8200,7.0550
//! ```
//!
//! Edges (weight in km, undirected):
//!
//! ```csv
//! id,from,to,weight
//! 0,0,1,0.85
//! ```
//!
//! Rows are loaded verbatim; dangling endpoints and bad weights are left for
//! [`build_graph`](crate::build_graph) to skip and count.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use wr_core::{EdgeId, GeoPoint, NodeId};

use crate::{Edge, GraphError, GraphResult, NetworkSnapshot, Node};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    id:   u32,
    name: String,
    lat:  f64,
    lon:  f64,
}

#[derive(Deserialize)]
struct EdgeRecord {
    id:     u32,
    from:   u32,
    to:     u32,
    weight: f64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a network from `nodes.csv` / `edges.csv` style files.
pub fn load_network_csv(nodes_path: &Path, edges_path: &Path) -> GraphResult<NetworkSnapshot> {
    let nodes = std::fs::File::open(nodes_path)?;
    let edges = std::fs::File::open(edges_path)?;
    load_network_readers(nodes, edges)
}

/// Like [`load_network_csv`] but accepts any `Read` sources.
///
/// Useful for testing (pass a `std::io::Cursor`).
pub fn load_network_readers<N: Read, E: Read>(nodes: N, edges: E) -> GraphResult<NetworkSnapshot> {
    let nodes = csv::Reader::from_reader(nodes)
        .deserialize::<NodeRecord>()
        .map(|row| {
            let r = row.map_err(|e| GraphError::Parse(format!("nodes: {e}")))?;
            let name = r.name.trim();
            if name.is_empty() {
                return Err(GraphError::Parse(format!("nodes: node {} has an empty name", r.id)));
            }
            Ok(Node {
                id:          NodeId(r.id),
                name:        name.to_owned(),
                coordinates: GeoPoint::new(r.lat, r.lon),
            })
        })
        .collect::<GraphResult<Vec<_>>>()?;

    let edges = csv::Reader::from_reader(edges)
        .deserialize::<EdgeRecord>()
        .map(|row| {
            let r = row.map_err(|e| GraphError::Parse(format!("edges: {e}")))?;
            Ok(Edge {
                id:        EdgeId(r.id),
                from_node: NodeId(r.from),
                to_node:   NodeId(r.to),
                weight:    r.weight,
            })
        })
        .collect::<GraphResult<Vec<_>>>()?;

    Ok(NetworkSnapshot::new(nodes, edges))
}
