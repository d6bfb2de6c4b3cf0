//! TOML configuration loading
//!
//! A missing config file is not an error: every field is optional and the
//! engine degrades (AI tier disabled, remote sync disabled) rather than
//! refusing to start.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default storage bucket for item photos
pub const DEFAULT_BUCKET: &str = "wardrobe-images";

/// Optional settings from `~/.config/mylook/config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// OpenAI API key (lowest-priority source, see key resolution)
    pub openai_api_key: Option<String>,
    /// Model tried first by the stylist client
    pub openai_model: Option<String>,
    /// Remote store base URL; absent means local-only operation
    pub supabase_url: Option<String>,
    /// Remote store publishable key
    pub supabase_key: Option<String>,
    /// Storage bucket for item photos
    pub supabase_bucket: Option<String>,
    /// Local cache database path override
    pub cache_path: Option<PathBuf>,
    /// tracing env-filter directive, e.g. "mylook_core=debug"
    pub log_filter: Option<String>,
}

impl TomlConfig {
    pub fn bucket(&self) -> &str {
        self.supabase_bucket.as_deref().unwrap_or(DEFAULT_BUCKET)
    }
}

/// Default configuration file path for the platform
pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("mylook").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
}

/// Default local cache path for the platform
pub fn default_cache_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("mylook").join("cache.db"))
        .unwrap_or_else(|| PathBuf::from("./mylook_cache.db"))
}

/// Load the TOML config, treating a missing file as empty defaults
pub fn load_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        return Ok(TomlConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read config failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse config failed: {}", e)))
}
