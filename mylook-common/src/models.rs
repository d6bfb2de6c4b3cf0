//! Core data model for the MyLook wardrobe engine
//!
//! Enumerated fields (category, season) coerce unrecognized input to a
//! default instead of failing: a malformed record is corrected, never
//! rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Predefined look styles offered to the user (free text is also accepted)
pub const PREDEFINED_LOOKS: [&str; 6] = [
    "Smart Casual",
    "Sport Casual",
    "Business",
    "Streetwear",
    "Date Night",
    "Formal",
];

/// Wardrobe item category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tops,
    Bottoms,
    Outerwear,
    Dresses,
    Shoes,
    Accessories,
}

impl Category {
    /// Canonical display order for the six categories
    pub const ALL: [Category; 6] = [
        Category::Tops,
        Category::Bottoms,
        Category::Outerwear,
        Category::Dresses,
        Category::Shoes,
        Category::Accessories,
    ];

    /// Parse a category name, coercing anything unrecognized to `Tops`
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "tops" => Category::Tops,
            "bottoms" => Category::Bottoms,
            "outerwear" => Category::Outerwear,
            "dresses" => Category::Dresses,
            "shoes" => Category::Shoes,
            "accessories" => Category::Accessories,
            _ => Category::Tops,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tops => "tops",
            Category::Bottoms => "bottoms",
            Category::Outerwear => "outerwear",
            Category::Dresses => "dresses",
            Category::Shoes => "shoes",
            Category::Accessories => "accessories",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Tops
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Season an item is suitable for (`All` matches every season)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    All,
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Parse a season name, coercing anything unrecognized to `All`
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "all" => Season::All,
            "spring" => Season::Spring,
            "summer" => Season::Summer,
            "autumn" => Season::Autumn,
            "winter" => Season::Winter,
            _ => Season::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::All => "all",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }
}

impl Default for Season {
    fn default() -> Self {
        Season::All
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categorical weather bucket derived from the provider's WMO weather code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherLabel {
    Clear,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
    Mixed,
    Unknown,
}

impl WeatherLabel {
    /// Map an Open-Meteo WMO weather code to a human label.
    ///
    /// Codes outside every bucket map to `Mixed`; a missing code maps to
    /// `Unknown`.
    pub fn from_code(code: Option<i32>) -> Self {
        let code = match code {
            Some(c) => c,
            None => return WeatherLabel::Unknown,
        };
        match code {
            0 => WeatherLabel::Clear,
            1..=3 => WeatherLabel::Cloudy,
            45 | 48 => WeatherLabel::Fog,
            51 | 53 | 55 | 56 | 57 => WeatherLabel::Drizzle,
            61 | 63 | 65 | 66 | 67 | 80 | 81 | 82 => WeatherLabel::Rain,
            71 | 73 | 75 | 77 | 85 | 86 => WeatherLabel::Snow,
            95 | 96 | 99 => WeatherLabel::Thunderstorm,
            _ => WeatherLabel::Mixed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherLabel::Clear => "clear",
            WeatherLabel::Cloudy => "cloudy",
            WeatherLabel::Fog => "fog",
            WeatherLabel::Drizzle => "drizzle",
            WeatherLabel::Rain => "rain",
            WeatherLabel::Snow => "snow",
            WeatherLabel::Thunderstorm => "thunderstorm",
            WeatherLabel::Mixed => "mixed",
            WeatherLabel::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for WeatherLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day/night bucket derived from the local hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Day,
    Night,
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TimeOfDay::Day => "day",
            TimeOfDay::Night => "night",
        })
    }
}

/// Which signal chain produced a resolved context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Both geolocation paths failed; clock-only context
    Fallback,
    /// Coordinates resolved but the weather fetch failed
    LocationOnly,
    /// Weather resolved from device coordinates
    WeatherDevice,
    /// Weather resolved from IP-based coordinates
    WeatherIp,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Provenance::Fallback => "fallback",
            Provenance::LocationOnly => "location_only",
            Provenance::WeatherDevice => "weather+device_gps",
            Provenance::WeatherIp => "weather+ip_fallback",
        })
    }
}

/// Reference to an item photo: either inline bytes (a data URL) or an
/// uploaded object (public URL plus the bucket path used for deletion)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageRef {
    Inline(String),
    Remote { url: String, path: String },
}

impl ImageRef {
    /// Best displayable source for the image (remote URL or the data URL)
    pub fn display_url(&self) -> &str {
        match self {
            ImageRef::Inline(data_url) => data_url,
            ImageRef::Remote { url, .. } => url,
        }
    }

    /// Storage path of the uploaded blob, when one exists
    pub fn storage_path(&self) -> Option<&str> {
        match self {
            ImageRef::Inline(_) => None,
            ImageRef::Remote { path, .. } => Some(path.as_str()),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, ImageRef::Remote { .. })
    }
}

impl Default for ImageRef {
    fn default() -> Self {
        ImageRef::Inline(String::new())
    }
}

/// A single digitized wardrobe item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WardrobeItem {
    pub id: Uuid,
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub style_tags: Vec<String>,
    #[serde(default)]
    pub season: Season,
    #[serde(default)]
    pub image: ImageRef,
    #[serde(default)]
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

impl WardrobeItem {
    /// True when the item is valid for the given season
    pub fn fits_season(&self, season: Season) -> bool {
        self.season == Season::All || self.season == season
    }
}

/// Ambient context a suggestion is generated against.
///
/// Derived, never persisted; replaced atomically once per session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub city: String,
    pub season: Season,
    pub weather: WeatherLabel,
    pub temperature_c: Option<f64>,
    pub time_of_day: TimeOfDay,
    pub source: Provenance,
}

impl Context {
    /// Clock-only context used when both geolocation paths fail
    pub fn local_fallback(now: DateTime<chrono::Local>) -> Self {
        use chrono::{Datelike, Timelike};
        Context {
            city: "Unknown".to_string(),
            season: crate::time::season_for_month(now.month()),
            weather: WeatherLabel::Unknown,
            temperature_c: None,
            time_of_day: crate::time::time_of_day_for_hour(now.hour()),
            source: Provenance::Fallback,
        }
    }

    /// Apply a UI-level time-of-day override (season is never overridden)
    pub fn with_time_of_day(mut self, time_of_day: TimeOfDay) -> Self {
        self.time_of_day = time_of_day;
        self
    }

    /// Flattened human-readable summary stored with history entries
    pub fn summary(&self) -> String {
        let temp = self
            .temperature_c
            .map(|t| t.to_string())
            .unwrap_or_else(|| "?".to_string());
        format!(
            "{}, {}, {}, {}C, {}",
            self.city, self.season, self.weather, temp, self.time_of_day
        )
    }
}

/// Which tier produced a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    Ai,
    Fallback,
}

/// A generated outfit, ephemeral until accepted into history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutfitSuggestion {
    pub look_type: String,
    pub source: SuggestionSource,
    pub rationale: String,
    /// Ordered, deduplicated by item id
    pub outfit: Vec<WardrobeItem>,
    /// Context snapshot at generation time
    pub context: Context,
}

impl OutfitSuggestion {
    /// Empty-outfit suggestions are shown but must not be accepted
    pub fn is_wearable(&self) -> bool {
        !self.outfit.is_empty()
    }
}

/// Lightweight outfit snapshot stored in history.
///
/// Not a full `WardrobeItem`: the item may be deleted later, so history
/// keeps only what it needs to render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutfitPiece {
    pub id: Uuid,
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub image_url: String,
}

impl From<&WardrobeItem> for OutfitPiece {
    fn from(item: &WardrobeItem) -> Self {
        OutfitPiece {
            id: item.id,
            name: item.name.clone(),
            category: item.category,
            image_url: item.image.display_url().to_string(),
        }
    }
}

/// An accepted outfit; immutable except for the favorite flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub accepted_at: DateTime<Utc>,
    pub look_type: String,
    pub outfit: Vec<OutfitPiece>,
    #[serde(default)]
    pub context_summary: String,
    #[serde(default)]
    pub is_favorite: bool,
}

/// User settings kept in the local cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "Settings::default_model")]
    pub model: String,
}

impl Settings {
    pub fn default_model() -> String {
        "gpt-4.1-mini".to_string()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_key: String::new(),
            model: Settings::default_model(),
        }
    }
}
