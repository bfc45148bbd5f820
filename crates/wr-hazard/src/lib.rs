//! `wr-hazard`: live-condition reweighting of the base graph.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                      |
//! |--------------|---------------------------------------------------------------|
//! | [`report`]   | `HazardReport`, `ReportStatus`, `ReportPriority`, `HazardKind`, `HazardSource` |
//! | [`weather`]  | `WeatherState`, `WeatherSource`, `OpenWeatherClient`, `WeatherConfig` |
//! | [`index`]    | `MidpointIndex`, an R-tree over edge midpoints                  |
//! | [`reweight`] | `Reweighter`, `ReweightConfig`, `Reweighted`, `reweight`      |
//! | [`error`]    | `HazardError`, `HazardResult<T>`                              |
//!
//! # Two passes
//!
//! ```text
//! weighted = base.clone()
//! ① Weather: if the current condition is rain/drizzle, every weight × 1.2
//! ② Hazards: for each open high/urgent report, every edge whose midpoint
//!             lies within 1 km is multiplied by 2.0 (block) or 1.5 (flood);
//!             penalties compound across reports
//! ```
//!
//! Every multiplication is followed by rounding to four decimals.  The base
//! graph is only ever borrowed.

pub mod error;
pub mod index;
pub mod report;
pub mod reweight;
pub mod weather;


pub use error::{HazardError, HazardResult};
pub use index::MidpointIndex;
pub use report::{HazardKind, HazardReport, HazardSource, NoHazards, ReportBook, ReportPriority, ReportStatus};
pub use reweight::{ReweightConfig, Reweighted, Reweighter, reweight};
pub use weather::{OpenWeatherClient, WeatherConfig, WeatherSource, WeatherState};
