//! Geolocation providers
//!
//! Three signal sources, in the order the context pipeline tries them:
//! device geolocation (supplied by the caller through `LocationProvider`),
//! IP-based lookup (which also yields an approximate city), and reverse
//! geocoding for a city name once coordinates are known.

use crate::error::{EngineError, EngineResult};
use crate::providers::Coordinates;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// IP geolocation endpoint
const IP_GEO_URL: &str = "https://ipapi.co/json/";

/// Reverse geocoding endpoint (Open-Meteo geocoding service)
const REVERSE_GEOCODE_URL: &str = "https://geocoding-api.open-meteo.com/v1/reverse";

/// Timeout for both geolocation requests
const GEO_TIMEOUT: Duration = Duration::from_secs(8);

/// Device position source, implemented by the caller (UI shell, CLI).
///
/// The context pipeline bounds the call with its own timeout; an
/// implementation may simply fail where no positioning hardware exists.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> EngineResult<Coordinates>;
}

/// IP-based location fix: coordinates plus an approximate city
#[derive(Debug, Clone)]
pub struct IpLocation {
    pub coords: Coordinates,
    pub city: Option<String>,
}

/// IP geolocation + reverse geocoding client
pub struct GeoClient {
    http_client: Client,
    ip_url: String,
    reverse_url: String,
}

impl GeoClient {
    pub fn new() -> Self {
        Self::with_base_urls(IP_GEO_URL.to_string(), REVERSE_GEOCODE_URL.to_string())
    }

    /// Override the endpoints (tests point these at local listeners)
    pub fn with_base_urls(ip_url: String, reverse_url: String) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(GEO_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            ip_url,
            reverse_url,
        }
    }

    /// Approximate location from the caller's public IP
    pub async fn lookup_ip(&self) -> EngineResult<IpLocation> {
        debug!("Querying IP geolocation");

        let response = self
            .http_client
            .get(&self.ip_url)
            .send()
            .await
            .map_err(|e| EngineError::from_reqwest("IP geolocation request", e))?;

        if !response.status().is_success() {
            return Err(EngineError::Api(format!(
                "IP geolocation returned {}",
                response.status()
            )));
        }

        let payload: IpGeoResponse = response
            .json()
            .await
            .map_err(|e| EngineError::Parse(format!("IP geolocation response: {}", e)))?;

        match (payload.latitude, payload.longitude) {
            (Some(latitude), Some(longitude)) => Ok(IpLocation {
                coords: Coordinates {
                    latitude,
                    longitude,
                },
                city: payload.city.filter(|c| !c.trim().is_empty()),
            }),
            _ => Err(EngineError::Parse(
                "IP geolocation response had no coordinates".to_string(),
            )),
        }
    }

    /// Best-effort city name for coordinates; `None` on any failure
    pub async fn reverse(&self, coords: Coordinates) -> Option<String> {
        let response = self
            .http_client
            .get(&self.reverse_url)
            .query(&[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("language", "en".to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            return None;
        }

        let payload: ReverseGeocodeResponse = response.json().await.ok()?;
        payload
            .results
            .into_iter()
            .next()
            .map(|r| r.name)
            .filter(|name| !name.trim().is_empty())
    }
}

impl Default for GeoClient {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Provider API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct IpGeoResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseGeocodeResponse {
    #[serde(default)]
    results: Vec<ReverseGeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct ReverseGeocodeResult {
    name: String,
}
