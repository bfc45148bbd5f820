//! Current weather at the network's reference location.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::HazardResult;

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "OPENWEATHERMAP_API_KEY";

// ── WeatherState ──────────────────────────────────────────────────────────────

/// A point-in-time weather reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherState {
    /// Primary condition category, e.g. "Rain", "Clouds", "light rain".
    pub main:          String,
    #[serde(default)]
    pub description:   String,
    #[serde(default)]
    pub temperature_c: Option<f64>,
    #[serde(default)]
    pub humidity_pct:  Option<f64>,
    #[serde(default)]
    pub wind_speed_ms: Option<f64>,
    #[serde(default)]
    pub location:      Option<String>,
    /// `true` when the reading was synthesised because no API key is set.
    #[serde(default)]
    pub mock:          bool,
}

impl WeatherState {
    pub fn new(main: impl Into<String>) -> Self {
        Self {
            main:          main.into(),
            description:   String::new(),
            temperature_c: None,
            humidity_pct:  None,
            wind_speed_ms: None,
            location:      None,
            mock:          false,
        }
    }

    pub fn clear() -> Self {
        Self::new("Clear")
    }

    /// The stand-in reading served when no API key is configured.
    pub fn mock() -> Self {
        Self {
            main:          "Clouds".into(),
            description:   "scattered clouds".into(),
            temperature_c: Some(28.5),
            humidity_pct:  Some(75.0),
            wind_speed_ms: Some(3.5),
            location:      Some("Port Harcourt".into()),
            mock:          true,
        }
    }

    /// Rain or drizzle in the primary category.
    pub fn is_wet(&self) -> bool {
        let main = self.main.to_lowercase();
        main.contains("rain") || main.contains("drizzle")
    }
}

// ── WeatherSource ─────────────────────────────────────────────────────────────

/// One read per reweight pass.  Errors are recoverable: the engine treats an
/// unreachable source as "no penalty".
pub trait WeatherSource: Send + Sync {
    fn current(&self) -> HazardResult<WeatherState>;
}

/// A fixed reading.
impl WeatherSource for WeatherState {
    fn current(&self) -> HazardResult<WeatherState> {
        Ok(self.clone())
    }
}

// ── OpenWeatherMap ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url:     String,
    /// Falls back to `$OPENWEATHERMAP_API_KEY`; with neither set the client
    /// serves [`WeatherState::mock`].
    pub api_key:      Option<String>,
    /// Reference location the network is weighted for.
    pub lat:          f64,
    pub lon:          f64,
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url:     "https://api.openweathermap.org/data/2.5".to_string(),
            api_key:      None,
            lat:          4.8156,
            lon:          7.0498,
            timeout_secs: 10,
        }
    }
}

impl WeatherConfig {
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

/// Blocking OpenWeatherMap "current weather" client.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    config:  WeatherConfig,
    api_key: Option<String>,
    client:  reqwest::blocking::Client,
}

impl OpenWeatherClient {
    pub fn new(config: WeatherConfig) -> HazardResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        let api_key = config.resolved_api_key();

        Ok(Self { config, api_key, client })
    }

    pub fn is_mock(&self) -> bool {
        self.api_key.is_none()
    }
}

impl WeatherSource for OpenWeatherClient {
    fn current(&self) -> HazardResult<WeatherState> {
        let Some(key) = &self.api_key else {
            return Ok(WeatherState::mock());
        };

        let url = format!("{}/weather", self.config.base_url.trim_end_matches('/'));
        let body = self
            .client
            .get(url)
            .query(&[
                ("lat", self.config.lat.to_string()),
                ("lon", self.config.lon.to_string()),
                ("appid", key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OwmResponse>())?;

        let state = body.into_state();
        debug!(main = %state.main, description = %state.description, "fetched weather");
        Ok(state)
    }
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    #[serde(default)]
    weather: Vec<OwmCondition>,
    main:    Option<OwmMain>,
    wind:    Option<OwmWind>,
    name:    Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    main:        String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp:     Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: Option<f64>,
}

impl OwmResponse {
    fn into_state(self) -> WeatherState {
        // An empty condition list reads as an unknown category: no penalty.
        let (main, description) = self
            .weather
            .into_iter()
            .next()
            .map(|c| (c.main, c.description))
            .unwrap_or_default();
        WeatherState {
            main,
            description,
            temperature_c: self.main.as_ref().and_then(|m| m.temp),
            humidity_pct:  self.main.as_ref().and_then(|m| m.humidity),
            wind_speed_ms: self.wind.and_then(|w| w.speed),
            location:      self.name,
            mock:          false,
        }
    }
}

#[cfg(test)]
pub(crate) fn parse_owm(json: &str) -> Result<WeatherState, serde_json::Error> {
    serde_json::from_str::<OwmResponse>(json).map(OwmResponse::into_state)
}
