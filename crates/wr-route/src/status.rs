//! Route lifecycle states.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where an assigned route is in its life.
///
/// ```text
/// pending --start--> active --complete--> completed
/// ```
///
/// `Completed` is terminal.  There is no cancel or reassign edge; a wrong
/// assignment has to be completed (or removed from the store by hand).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStatus {
    Pending,
    Active,
    Completed,
}

impl RouteStatus {
    /// `Pending` or `Active`: the route still occupies its operator.
    #[inline]
    pub fn is_open(self) -> bool {
        !matches!(self, RouteStatus::Completed)
    }

    /// Only single forward steps are legal.
    #[inline]
    pub fn can_transition_to(self, next: RouteStatus) -> bool {
        matches!(
            (self, next),
            (RouteStatus::Pending, RouteStatus::Active) | (RouteStatus::Active, RouteStatus::Completed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RouteStatus::Pending   => "pending",
            RouteStatus::Active    => "active",
            RouteStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending"   => Ok(RouteStatus::Pending),
            "active"    => Ok(RouteStatus::Active),
            "completed" => Ok(RouteStatus::Completed),
            other       => Err(format!(
                "unknown route status {other:?}: expected \"pending\", \"active\", or \"completed\""
            )),
        }
    }
}
