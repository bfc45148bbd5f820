//! Engine configuration, read from a JSON file.
//!
//! ```json
//! {
//!   "weather":  { "api_key": null, "lat": 4.8156, "lon": 7.0498 },
//!   "reweight": { "wet_multiplier": 1.2, "hazard_radius_km": 1.0 }
//! }
//! ```
//!
//! Every field has a default, so `{}` is a complete configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use wr_hazard::{ReweightConfig, WeatherConfig};

use crate::{EngineError, EngineResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weather:  WeatherConfig,
    pub reweight: ReweightConfig,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| EngineError::Config(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate the file at `path`.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> EngineResult<()> {
        self.reweight.validate()?;
        if self.weather.timeout_secs == 0 {
            return Err(EngineError::Config("weather.timeout_secs must be at least 1".into()));
        }
        if !(-90.0..=90.0).contains(&self.weather.lat) || !(-180.0..=180.0).contains(&self.weather.lon) {
            return Err(EngineError::Config(format!(
                "weather reference location ({}, {}) is out of range",
                self.weather.lat, self.weather.lon
            )));
        }
        Ok(())
    }
}
