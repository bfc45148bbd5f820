//! Weather and hazard reweighting.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use wr_graph::{Graph, NodeCoords, round_weight};

use crate::{HazardError, HazardKind, HazardReport, HazardResult, MidpointIndex, WeatherState};

// ── ReweightConfig ────────────────────────────────────────────────────────────

/// Multipliers and radius used by the reweighter.
///
/// Every multiplier must be `>= 1.0` so a reweighted graph is never cheaper
/// than its base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReweightConfig {
    /// Applied to every edge when it is raining or drizzling.
    pub wet_multiplier:   f64,
    pub block_multiplier: f64,
    pub flood_multiplier: f64,
    /// Reports farther than this from an edge midpoint do not affect it.
    pub hazard_radius_km: f64,
    /// Decimal places kept after each multiplication.
    pub decimals:         u32,
}

impl Default for ReweightConfig {
    fn default() -> Self {
        Self {
            wet_multiplier:   1.2,
            block_multiplier: 2.0,
            flood_multiplier: 1.5,
            hazard_radius_km: 1.0,
            decimals:         4,
        }
    }
}

impl ReweightConfig {
    pub fn validate(&self) -> HazardResult<()> {
        for (name, m) in [
            ("wet_multiplier", self.wet_multiplier),
            ("block_multiplier", self.block_multiplier),
            ("flood_multiplier", self.flood_multiplier),
        ] {
            if !(m.is_finite() && m >= 1.0) {
                return Err(HazardError::InvalidConfig(format!("{name} must be >= 1.0, got {m}")));
            }
        }
        if !(self.hazard_radius_km.is_finite() && self.hazard_radius_km > 0.0) {
            return Err(HazardError::InvalidConfig(format!(
                "hazard_radius_km must be positive, got {}",
                self.hazard_radius_km
            )));
        }
        if self.decimals > 12 {
            return Err(HazardError::InvalidConfig(format!("decimals must be <= 12, got {}", self.decimals)));
        }
        Ok(())
    }

    pub fn multiplier_for(&self, kind: HazardKind) -> f64 {
        match kind {
            HazardKind::Block => self.block_multiplier,
            HazardKind::Flood => self.flood_multiplier,
            HazardKind::Other => 1.0,
        }
    }
}

// ── Reweighter ────────────────────────────────────────────────────────────────

/// The derived graph plus a record of what was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Reweighted {
    pub graph:              Graph,
    /// `1.0` when dry or when no reading was available.
    pub weather_multiplier: f64,
    /// Reports that took part in the hazard pass.
    pub hazards_applied:    usize,
    /// Individual (report, edge) penalties applied.
    pub edge_penalties:     usize,
}

/// Applies weather and hazard multipliers to a base graph.
#[derive(Debug, Clone, Default)]
pub struct Reweighter {
    pub config: ReweightConfig,
}

impl Reweighter {
    pub fn new(config: ReweightConfig) -> HazardResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// `wet_multiplier` when `weather` says rain or drizzle, else `1.0`.
    /// `None` means the reading failed and counts as dry.
    pub fn weather_multiplier(&self, weather: Option<&WeatherState>) -> f64 {
        match weather {
            Some(w) if w.is_wet() => self.config.wet_multiplier,
            _ => 1.0,
        }
    }

    /// Produce a reweighted copy of `base`.
    ///
    /// `reports` are filtered again here; callers may pass the raw store
    /// contents.  Reports are applied in the order given, each one rounding
    /// after its multiplication, so overlapping hazards compound.
    pub fn apply(
        &self,
        base:    &Graph,
        coords:  &NodeCoords,
        weather: Option<&WeatherState>,
        reports: &[HazardReport],
    ) -> Reweighted {
        let decimals = self.config.decimals;
        let mut graph = base.clone();

        // ── Weather pass ──────────────────────────────────────────────────
        let weather_multiplier = self.weather_multiplier(weather);
        if weather_multiplier != 1.0 {
            graph.map_weights(|w| round_weight(w * weather_multiplier, decimals));
            debug!(weather_multiplier, "applied weather penalty");
        }

        // ── Hazard pass ───────────────────────────────────────────────────
        let placed: Vec<(&HazardReport, f64)> = reports
            .iter()
            .filter(|r| r.qualifies())
            .filter_map(|r| {
                let m = self.config.multiplier_for(r.hazard_kind());
                (r.coordinates.is_some() && m != 1.0).then_some((r, m))
            })
            .collect();

        let mut edge_penalties = 0;
        if !placed.is_empty() {
            let index = MidpointIndex::build(base, coords);
            if index.unplaced > 0 {
                debug!(unplaced = index.unplaced, "edges without coordinates ignored by hazard pass");
            }
            let hits = self.hazard_hits(&index, &placed);
            for ((_, multiplier), edges) in placed.iter().zip(hits) {
                for i in edges {
                    let e = index.edge(i);
                    if graph.scale_edge(&e.a, &e.b, *multiplier, decimals) {
                        edge_penalties += 1;
                    }
                }
            }
        }

        if weather_multiplier != 1.0 || edge_penalties > 0 {
            info!(weather_multiplier, hazards = placed.len(), edge_penalties, "reweighted graph");
        }

        Reweighted {
            graph,
            weather_multiplier,
            hazards_applied: placed.len(),
            edge_penalties,
        }
    }
}

impl Reweighter {
    /// Indexed edges within range of each placed report, in report order.
    ///
    /// The lookups are independent and run on Rayon when the `parallel`
    /// feature is on.  Multiplication stays sequential in the caller so
    /// compounding and rounding happen in the same order either way.
    fn hazard_hits(&self, index: &MidpointIndex, placed: &[(&HazardReport, f64)]) -> Vec<Vec<usize>> {
        let radius = self.config.hazard_radius_km;

        #[cfg(not(feature = "parallel"))]
        {
            placed
                .iter()
                .map(|(r, _)| r.coordinates.map_or_else(Vec::new, |at| index.edges_within(at, radius)))
                .collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            placed
                .par_iter()
                .map(|(r, _)| r.coordinates.map_or_else(Vec::new, |at| index.edges_within(at, radius)))
                .collect()
        }
    }
}

/// Reweight with the default multipliers and return only the new graph.
pub fn reweight(
    base:    &Graph,
    coords:  &NodeCoords,
    weather: Option<&WeatherState>,
    reports: &[HazardReport],
) -> Graph {
    Reweighter::default().apply(base, coords, weather, reports).graph
}
