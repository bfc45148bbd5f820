//! `wr-core`: foundational types for the `wasteroute` route engine.
//!
//! This crate is a dependency of every other `wr-*` crate.  It has no `wr-*`
//! dependencies and no required external ones (only optional `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                                    |
//! |-----------|-------------------------------------------------------------|
//! | [`ids`]   | `NodeId`, `EdgeId`, `RouteId`, `OperatorId`                 |
//! | [`geo`]   | `GeoPoint`, haversine distance in km, arithmetic midpoint   |
//! | [`time`]  | `Timestamp`, `Clock`, `SystemClock`, `ManualClock`          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod geo;
pub mod ids;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geo::GeoPoint;
pub use ids::{EdgeId, NodeId, OperatorId, RouteId};
pub use time::{Clock, ManualClock, SystemClock, Timestamp};
