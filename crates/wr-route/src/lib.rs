//! `wr-route`: assigned routes and their lifecycle.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                         |
//! |-------------|------------------------------------------------------------------|
//! | [`status`]  | `RouteStatus`: `pending → active → completed`                   |
//! | [`route`]   | `Route`, `NewRoute`                                              |
//! | [`store`]   | `RouteStore` trait, `MemoryRouteStore`                           |
//! | [`sqlite`]  | `SqliteRouteStore` (feature = `"sqlite"` only)                   |
//! | [`manager`] | `RouteManager<S, C>`: assign, start, complete, query            |
//! | [`error`]   | `RouteError`, `RouteResult<T>`                                   |
//!
//! # One open route per operator
//!
//! An operator may hold at most one `pending`/`active` route.  Stores enforce
//! this inside [`RouteStore::insert_if_idle`], which checks and inserts as a
//! single atomic step; a second assignment fails with
//! [`RouteError::OperatorBusy`] until the first route is completed.
//!
//! # Feature flags
//!
//! | Flag     | Effect                                              |
//! |----------|-----------------------------------------------------|
//! | `sqlite` | Enables `SqliteRouteStore` via `rusqlite`.          |

pub mod error;
pub mod manager;
pub mod route;
pub mod status;
pub mod store;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use error::{RouteError, RouteResult};
pub use manager::{Assignment, RouteManager};
pub use route::{NewRoute, Route};
pub use status::RouteStatus;
pub use store::{MemoryRouteStore, RouteStore};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRouteStore;
