//! Weather provider client (Open-Meteo)
//!
//! Fetches the current temperature and coded weather condition for a pair
//! of coordinates. One bounded request per pipeline run, no retries.

use crate::error::{EngineError, EngineResult};
use crate::providers::Coordinates;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Open-Meteo forecast endpoint
const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Timeout for the weather request
const WEATHER_TIMEOUT: Duration = Duration::from_secs(10);

/// Current weather observation
#[derive(Debug, Clone, Copy)]
pub struct CurrentWeather {
    pub temperature_c: Option<f64>,
    pub weather_code: Option<i32>,
}

/// Open-Meteo current-weather client
pub struct WeatherClient {
    http_client: Client,
    base_url: String,
}

impl WeatherClient {
    pub fn new() -> Self {
        Self::with_base_url(OPEN_METEO_URL.to_string())
    }

    /// Override the endpoint (tests point this at a local listener)
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(WEATHER_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            base_url,
        }
    }

    /// Fetch current temperature and weather code for the coordinates
    pub async fn current(&self, coords: Coordinates) -> EngineResult<CurrentWeather> {
        debug!(lat = coords.latitude, lon = coords.longitude, "Querying weather provider");

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("current", "temperature_2m,weather_code".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .map_err(|e| EngineError::from_reqwest("weather request", e))?;

        if !response.status().is_success() {
            return Err(EngineError::Api(format!(
                "Weather provider returned {}",
                response.status()
            )));
        }

        let payload: ForecastResponse = response
            .json()
            .await
            .map_err(|e| EngineError::Parse(format!("Weather response: {}", e)))?;

        let current = payload.current.unwrap_or_default();
        debug!(
            temperature = ?current.temperature_2m,
            code = ?current.weather_code,
            "Weather fetch complete"
        );

        Ok(CurrentWeather {
            temperature_c: current.temperature_2m,
            weather_code: current.weather_code,
        })
    }
}

impl Default for WeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Open-Meteo API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct CurrentBlock {
    temperature_2m: Option<f64>,
    weather_code: Option<i32>,
}
