//! Local cache: a durable key → JSON-blob store over SQLite
//!
//! The cache is a non-authoritative mirror of the remote store. It holds
//! three logical keys (wardrobe list, history list, user settings). A
//! corrupt blob is corrected by falling back to the default value and
//! logging a warning, never by failing the caller.

use crate::error::EngineResult;
use mylook_common::models::{HistoryEntry, Settings, WardrobeItem};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::warn;

/// Logical cache keys
pub const KEY_WARDROBE: &str = "mylook.wardrobe";
pub const KEY_HISTORY: &str = "mylook.history";
pub const KEY_SETTINGS: &str = "mylook.settings";

/// Open (or create) the cache database and its table
pub async fn open_cache(db_path: &Path) -> EngineResult<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(mylook_common::Error::Io)?;
    }

    // SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to cache database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cache (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await?;

    Ok(pool)
}

/// Load the cached wardrobe list (missing or corrupt → empty)
pub async fn load_wardrobe(db: &SqlitePool) -> EngineResult<Vec<WardrobeItem>> {
    load_blob(db, KEY_WARDROBE).await
}

/// Overwrite the cached wardrobe list
pub async fn store_wardrobe(db: &SqlitePool, items: &[WardrobeItem]) -> EngineResult<()> {
    store_blob(db, KEY_WARDROBE, &items).await
}

/// Load the cached history list (missing or corrupt → empty)
pub async fn load_history(db: &SqlitePool) -> EngineResult<Vec<HistoryEntry>> {
    load_blob(db, KEY_HISTORY).await
}

/// Overwrite the cached history list
pub async fn store_history(db: &SqlitePool, entries: &[HistoryEntry]) -> EngineResult<()> {
    store_blob(db, KEY_HISTORY, &entries).await
}

/// Load user settings (missing or corrupt → defaults)
pub async fn load_settings(db: &SqlitePool) -> EngineResult<Settings> {
    load_blob(db, KEY_SETTINGS).await
}

/// Persist user settings
pub async fn store_settings(db: &SqlitePool, settings: &Settings) -> EngineResult<()> {
    store_blob(db, KEY_SETTINGS, settings).await
}

/// Generic blob getter: missing key or undecodable value yields the
/// type's default
async fn load_blob<T>(db: &SqlitePool, key: &str) -> EngineResult<T>
where
    T: DeserializeOwned + Default,
{
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM cache WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;

    match row {
        Some((value,)) => match serde_json::from_str(&value) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                warn!(key, error = %e, "Corrupt cache blob, using default");
                Ok(T::default())
            }
        },
        None => Ok(T::default()),
    }
}

/// Generic blob setter (upsert)
async fn store_blob<T>(db: &SqlitePool, key: &str, value: &T) -> EngineResult<()>
where
    T: Serialize,
{
    let json = serde_json::to_string(value).map_err(mylook_common::Error::Serialization)?;
    sqlx::query(
        "INSERT INTO cache (key, value) VALUES (?, ?) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(json)
    .execute(db)
    .await?;
    Ok(())
}
