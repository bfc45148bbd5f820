//! Error types for wr-hazard.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HazardError {
    /// A live-condition source could not be reached or returned garbage.
    /// The engine recovers from this by applying no penalty.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("invalid reweight configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for HazardError {
    fn from(e: reqwest::Error) -> Self {
        HazardError::UpstreamUnavailable(e.to_string())
    }
}

pub type HazardResult<T> = Result<T, HazardError>;
