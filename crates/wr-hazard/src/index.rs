//! Spatial index over edge midpoints.
//!
//! An R-tree (via `rstar`) holds one `[lat, lon]` point per undirected edge.
//! A hazard query first collects the midpoints inside a conservative
//! lat/lon box around the report, then confirms each with the exact
//! haversine distance, so the box only has to over-approximate the circle.

use rstar::{AABB, RTree, RTreeObject};

use wr_core::GeoPoint;
use wr_core::geo::EARTH_RADIUS_KM;
use wr_graph::{Graph, NodeCoords};

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct MidpointEntry {
    point: [f64; 2], // [lat, lon]
    edge:  usize,
}

impl RTreeObject for MidpointEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

// ── MidpointIndex ─────────────────────────────────────────────────────────────

/// One undirected edge `a < b` with the midpoint of its endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedEdge {
    pub a:   String,
    pub b:   String,
    pub mid: GeoPoint,
}

/// Edge midpoints of a graph, queryable by distance.
pub struct MidpointIndex {
    edges:       Vec<IndexedEdge>,
    tree:        RTree<MidpointEntry>,
    /// Edges left out because an endpoint has no known coordinates.
    pub unplaced: usize,
}

impl MidpointIndex {
    /// Index every edge `a–b` of `graph` with `a < b` lexicographically, so
    /// each undirected edge appears once.  Self-loops are not indexed.
    pub fn build(graph: &Graph, coords: &NodeCoords) -> Self {
        let mut edges    = Vec::new();
        let mut unplaced = 0;

        for (a, b, _) in graph.entries().filter(|(a, b, _)| a < b) {
            match (coords.get(a), coords.get(b)) {
                (Some(&ca), Some(&cb)) => edges.push(IndexedEdge {
                    a:   a.to_owned(),
                    b:   b.to_owned(),
                    mid: ca.midpoint(cb),
                }),
                _ => unplaced += 1,
            }
        }

        let entries: Vec<MidpointEntry> = edges
            .iter()
            .enumerate()
            .map(|(i, e)| MidpointEntry { point: [e.mid.lat, e.mid.lon], edge: i })
            .collect();

        Self { edges, tree: RTree::bulk_load(entries), unplaced }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edge(&self, i: usize) -> &IndexedEdge {
        &self.edges[i]
    }

    /// Edges whose midpoint is within `radius_km` (inclusive) of `p`, in
    /// ascending index order.
    pub fn edges_within(&self, p: GeoPoint, radius_km: f64) -> Vec<usize> {
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope(&search_box(p, radius_km))
            .map(|e| e.edge)
            .filter(|&i| self.edges[i].mid.distance_km(p) <= radius_km)
            .collect();
        hits.sort_unstable();
        hits
    }
}

/// A lat/lon box guaranteed to contain every point within `radius_km` of `p`.
///
/// Latitude span is exact on a sphere; longitude span widens with latitude
/// and is padded by 1 %.  Near the poles or across the antimeridian the box
/// falls back to the full longitude range.
fn search_box(p: GeoPoint, radius_km: f64) -> AABB<[f64; 2]> {
    let lat_half = (radius_km / EARTH_RADIUS_KM).to_degrees() * 1.01 + 1e-9;

    let max_abs_lat = p.lat.abs() + lat_half;
    let cos_lat = max_abs_lat.min(90.0).to_radians().cos();
    let lon_half = if cos_lat > 1e-6 { lat_half / cos_lat } else { f64::INFINITY };

    let (lon_lo, lon_hi) =
        if lon_half >= 180.0 || p.lon - lon_half < -180.0 || p.lon + lon_half > 180.0 {
            (f64::MIN, f64::MAX)
        } else {
            (p.lon - lon_half, p.lon + lon_half)
        };

    AABB::from_corners([p.lat - lat_half, lon_lo], [p.lat + lat_half, lon_hi])
}
