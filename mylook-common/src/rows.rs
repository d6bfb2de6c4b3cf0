//! Remote record shapes for the two collections.
//!
//! These serde structs are the single schema-mapping table per collection:
//! field renames define the wire column names, `#[serde(default)]` defines
//! the default-on-missing behavior, and the `From` impls are the only two
//! conversion paths (row → model, model → row).

use crate::models::{
    Category, HistoryEntry, ImageRef, OutfitPiece, Season, WardrobeItem,
};
use crate::sanitize;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `wardrobe_items` row as stored remotely
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WardrobeRow {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub style_tags: Vec<String>,
    #[serde(default)]
    pub season: String,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub image_path: String,
    pub created_at: DateTime<Utc>,
}

impl From<WardrobeRow> for WardrobeItem {
    fn from(row: WardrobeRow) -> Self {
        WardrobeItem {
            id: row.id,
            name: sanitize::sanitize_name(&row.name),
            category: Category::parse_or_default(&row.category),
            style_tags: sanitize::sanitize_tags(row.style_tags),
            season: Season::parse_or_default(&row.season),
            image: ImageRef::Remote {
                url: row.image_url,
                path: row.image_path,
            },
            is_favorite: row.is_favorite,
            created_at: row.created_at,
        }
    }
}

impl From<&WardrobeItem> for WardrobeRow {
    fn from(item: &WardrobeItem) -> Self {
        let (image_url, image_path) = match &item.image {
            ImageRef::Remote { url, path } => (url.clone(), path.clone()),
            // Inline bytes never travel in a row; the image is uploaded
            // first and the row carries the resulting URL/path.
            ImageRef::Inline(_) => (String::new(), String::new()),
        };
        WardrobeRow {
            id: item.id,
            name: item.name.clone(),
            category: item.category.to_string(),
            style_tags: item.style_tags.clone(),
            season: item.season.to_string(),
            is_favorite: item.is_favorite,
            image_url,
            image_path,
            created_at: item.created_at,
        }
    }
}

/// `history_entries` row as stored remotely
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRow {
    pub id: Uuid,
    pub accepted_at: DateTime<Utc>,
    #[serde(default)]
    pub look_type: String,
    #[serde(default)]
    pub outfit: Vec<OutfitPiece>,
    #[serde(default)]
    pub context_summary: String,
    #[serde(default)]
    pub is_favorite: bool,
}

impl From<HistoryRow> for HistoryEntry {
    fn from(row: HistoryRow) -> Self {
        HistoryEntry {
            id: row.id,
            accepted_at: row.accepted_at,
            look_type: row.look_type,
            outfit: row.outfit,
            context_summary: row.context_summary,
            is_favorite: row.is_favorite,
        }
    }
}

impl From<&HistoryEntry> for HistoryRow {
    fn from(entry: &HistoryEntry) -> Self {
        HistoryRow {
            id: entry.id,
            accepted_at: entry.accepted_at,
            look_type: entry.look_type.clone(),
            outfit: entry.outfit.clone(),
            context_summary: entry.context_summary.clone(),
            is_favorite: entry.is_favorite,
        }
    }
}
