//! Context Resolution Pipeline
//!
//! Produces a best-effort `Context` from device signals and the weather
//! provider. The pipeline never fails: every step degrades to a narrower
//! but valid result, and only total failure of both geolocation paths
//! forces the terminal clock-only fallback. No step runs twice within one
//! invocation.

use crate::providers::geo::{GeoClient, LocationProvider};
use crate::providers::weather::WeatherClient;
use crate::providers::Coordinates;
use chrono::{Datelike, Local, Timelike};
use mylook_common::models::{Context, Provenance, WeatherLabel};
use mylook_common::time::{season_for_month, time_of_day_for_hour};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Bound on the device geolocation call
const DEVICE_LOCATION_TIMEOUT: Duration = Duration::from_secs(8);

/// Which geolocation path produced the coordinates
enum LocationFix {
    Device(Coordinates),
    Ip { coords: Coordinates, city: Option<String> },
}

/// Resolve the ambient context for this session.
///
/// `device` is the caller-supplied position source (absent on platforms
/// without one). The returned context is a complete value intended to
/// replace the previous one atomically.
pub async fn resolve_context(
    device: Option<&dyn LocationProvider>,
    geo: &GeoClient,
    weather: &WeatherClient,
) -> Context {
    let now = Local::now();
    let season = season_for_month(now.month());
    let time_of_day = time_of_day_for_hour(now.hour());

    // Step 1: device geolocation, bounded; step 2: IP fallback.
    let fix = match locate_device(device).await {
        Some(coords) => LocationFix::Device(coords),
        None => match geo.lookup_ip().await {
            Ok(ip) => LocationFix::Ip {
                coords: ip.coords,
                city: ip.city,
            },
            Err(e) => {
                warn!(error = %e, "Both geolocation paths failed, using clock-only context");
                return Context::local_fallback(now);
            }
        },
    };

    let (coords, mut city, weather_source) = match fix {
        LocationFix::Device(coords) => (coords, None, Provenance::WeatherDevice),
        LocationFix::Ip { coords, city } => (coords, city, Provenance::WeatherIp),
    };

    // Step 3: weather fetch. A failure here keeps the location fix but
    // leaves the weather fields unknown.
    let observation = match weather.current(coords).await {
        Ok(obs) => Some(obs),
        Err(e) => {
            warn!(error = %e, "Weather fetch failed, context is location-only");
            None
        }
    };

    // Step 4: reverse geocoding, best-effort, only if still unresolved.
    if city.is_none() {
        city = geo.reverse(coords).await;
    }

    let context = match observation {
        Some(obs) => Context {
            city: city.unwrap_or_else(|| "Unknown".to_string()),
            season,
            weather: WeatherLabel::from_code(obs.weather_code),
            temperature_c: obs.temperature_c,
            time_of_day,
            source: weather_source,
        },
        None => Context {
            city: city.unwrap_or_else(|| "Unknown".to_string()),
            season,
            weather: WeatherLabel::Unknown,
            temperature_c: None,
            time_of_day,
            source: Provenance::LocationOnly,
        },
    };

    debug!(
        city = %context.city,
        weather = %context.weather,
        source = %context.source,
        "Context resolved"
    );
    context
}

/// Device geolocation bounded by `DEVICE_LOCATION_TIMEOUT`.
///
/// Absence of a provider, provider failure, and timeout all count as the
/// same outcome: fall through to the IP path.
async fn locate_device(device: Option<&dyn LocationProvider>) -> Option<Coordinates> {
    let provider = device?;
    match timeout(DEVICE_LOCATION_TIMEOUT, provider.current_position()).await {
        Ok(Ok(coords)) => Some(coords),
        Ok(Err(e)) => {
            debug!(error = %e, "Device geolocation failed");
            None
        }
        Err(_) => {
            debug!("Device geolocation timed out");
            None
        }
    }
}
