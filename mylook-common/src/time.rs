//! Calendar derivation helpers
//!
//! Season and time-of-day come purely from the local calendar clock,
//! independent of hemisphere or any weather-provider data.

use crate::models::{Season, TimeOfDay};
use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Season for a 1-based calendar month.
///
/// Dec/Jan/Feb → winter, Mar–May → spring, Jun–Aug → summer,
/// Sep–Nov → autumn.
pub fn season_for_month(month: u32) -> Season {
    match month {
        12 | 1 | 2 => Season::Winter,
        3..=5 => Season::Spring,
        6..=8 => Season::Summer,
        _ => Season::Autumn,
    }
}

/// Time-of-day bucket for a 0-based local hour: 06:00–18:59 is day
pub fn time_of_day_for_hour(hour: u32) -> TimeOfDay {
    if (6..19).contains(&hour) {
        TimeOfDay::Day
    } else {
        TimeOfDay::Night
    }
}
