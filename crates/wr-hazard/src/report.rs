//! Citizen hazard reports as read from the report store.

use serde::{Deserialize, Serialize};

use wr_core::GeoPoint;

use crate::HazardResult;

/// Review state of a report.  Only `Pending` and `Reviewing` are "open".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Reviewing,
    Resolved,
    Rejected,
}

impl ReportStatus {
    #[inline]
    pub fn is_open(self) -> bool {
        matches!(self, ReportStatus::Pending | ReportStatus::Reviewing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl ReportPriority {
    #[inline]
    pub fn is_severe(self) -> bool {
        self >= ReportPriority::High
    }
}

/// What a report's free-text type means for routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardKind {
    /// Type mentions "block": the road is obstructed.
    Block,
    /// Type mentions "flood".
    Flood,
    /// Anything else (full bin, damaged bin, …): no routing effect.
    Other,
}

impl HazardKind {
    /// Case-insensitive substring match.  "block" wins over "flood" when a
    /// type mentions both.
    pub fn classify(report_type: &str) -> Self {
        let t = report_type.to_lowercase();
        if t.contains("block") {
            HazardKind::Block
        } else if t.contains("flood") {
            HazardKind::Flood
        } else {
            HazardKind::Other
        }
    }
}

/// The projection of a citizen report the engine reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardReport {
    #[serde(rename = "type")]
    pub kind:        String,
    /// Reports filed without a location cannot be placed and are ignored.
    #[serde(default)]
    pub coordinates: Option<GeoPoint>,
    pub status:      ReportStatus,
    pub priority:    ReportPriority,
}

impl HazardReport {
    pub fn new(
        kind:        impl Into<String>,
        coordinates: GeoPoint,
        status:      ReportStatus,
        priority:    ReportPriority,
    ) -> Self {
        Self { kind: kind.into(), coordinates: Some(coordinates), status, priority }
    }

    /// Open and high/urgent, matching the store query the engine issues.
    #[inline]
    pub fn qualifies(&self) -> bool {
        self.status.is_open() && self.priority.is_severe()
    }

    #[inline]
    pub fn hazard_kind(&self) -> HazardKind {
        HazardKind::classify(&self.kind)
    }
}

// ── Sources ───────────────────────────────────────────────────────────────────

/// Read-only query against the report store:
/// `status ∈ {pending, reviewing} AND priority ∈ {high, urgent}`.
pub trait HazardSource: Send + Sync {
    fn open_hazards(&self) -> HazardResult<Vec<HazardReport>>;
}

/// An in-memory report store.
#[derive(Debug, Clone, Default)]
pub struct ReportBook {
    pub reports: Vec<HazardReport>,
}

impl ReportBook {
    pub fn new(reports: Vec<HazardReport>) -> Self {
        Self { reports }
    }
}

impl HazardSource for ReportBook {
    fn open_hazards(&self) -> HazardResult<Vec<HazardReport>> {
        Ok(self.reports.iter().filter(|r| r.qualifies()).cloned().collect())
    }
}

/// A source with nothing to report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHazards;

impl HazardSource for NoHazards {
    fn open_hazards(&self) -> HazardResult<Vec<HazardReport>> {
        Ok(Vec::new())
    }
}
