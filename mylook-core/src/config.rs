//! Configuration resolution for the MyLook core
//!
//! The stylist credential is resolved from three tiers in priority order:
//! cached settings → environment variable → TOML config. A missing key is
//! not an error — it disables the AI tier and the engine runs on the
//! fallback tier alone.

use mylook_common::config::TomlConfig;
use mylook_common::models::Settings;
use tracing::{info, warn};

/// Environment variable holding the stylist API key
pub const API_KEY_ENV: &str = "MYLOOK_OPENAI_API_KEY";

/// Resolve the stylist API key from the three-tier configuration
pub fn resolve_api_key(settings: &Settings, toml_config: &TomlConfig) -> Option<String> {
    let settings_key = Some(settings.api_key.clone()).filter(|k| is_valid_key(k));
    let env_key = std::env::var(API_KEY_ENV).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_config
        .openai_api_key
        .clone()
        .filter(|k| is_valid_key(k));

    let mut sources = Vec::new();
    if settings_key.is_some() {
        sources.push("settings");
    }
    if env_key.is_some() {
        sources.push("environment");
    }
    if toml_key.is_some() {
        sources.push("TOML");
    }
    if sources.len() > 1 {
        warn!(
            "Stylist API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    let resolved = settings_key.or(env_key).or(toml_key);
    match &resolved {
        Some(_) => info!("Stylist API key resolved, AI tier enabled"),
        None => info!("No stylist API key configured, AI tier disabled"),
    }
    resolved
}

/// Resolve the model tried first by the stylist: settings, then TOML,
/// then the built-in default
pub fn resolve_model(settings: &Settings, toml_config: &TomlConfig) -> String {
    if !settings.model.trim().is_empty() {
        return settings.model.clone();
    }
    toml_config
        .openai_model
        .clone()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(Settings::default_model)
}

/// Validate an API key (non-empty, non-whitespace)
fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
