//! # MyLook Core
//!
//! Engine crate for the MyLook wardrobe assistant:
//! - Context Resolution Pipeline (device/IP geolocation + weather)
//! - Suggestion Engine (AI stylist tier with deterministic fallback)
//! - Local/remote Reconciliation Engine
//! - Local SQLite cache and local-first mutations
//!
//! The UI is an external collaborator: it calls into this crate with
//! plain data and renders whatever comes back.

pub mod ai;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod media;
pub mod mutations;
pub mod providers;
pub mod reconcile;
pub mod remote;
pub mod suggest;

pub use crate::error::{EngineError, EngineResult};

use crate::remote::RemoteStore;
use mylook_common::models::{Context, HistoryEntry, OutfitSuggestion, Settings, WardrobeItem};
use mylook_common::rows::HistoryRow;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Application state owned by the top-level component.
///
/// Engine functions stay pure functions of (state-slice, inputs); nothing
/// in this crate reads ambient globals.
pub struct AppState {
    pub db: SqlitePool,
    pub remote: Option<Arc<dyn RemoteStore>>,
    pub wardrobe: Vec<WardrobeItem>,
    pub history: Vec<HistoryEntry>,
    pub settings: Settings,
    /// Resolved once per session, replaced atomically
    pub context: Option<Context>,
}

impl AppState {
    /// Load cached state from the local cache
    pub async fn load(
        db: SqlitePool,
        remote: Option<Arc<dyn RemoteStore>>,
    ) -> EngineResult<Self> {
        let wardrobe = cache::load_wardrobe(&db).await?;
        let history = cache::load_history(&db).await?;
        let settings = cache::load_settings(&db).await?;
        Ok(AppState {
            db,
            remote,
            wardrobe,
            history,
            settings,
            context: None,
        })
    }

    /// Run startup reconciliation and adopt the authoritative collections
    pub async fn reconcile(&mut self) -> EngineResult<Option<reconcile::SyncReport>> {
        let Some(remote) = self.remote.clone() else {
            return Ok(None);
        };
        let (wardrobe, history, report) =
            reconcile::reconcile_all(remote.as_ref(), &self.db).await?;
        self.wardrobe = wardrobe;
        self.history = history;
        Ok(Some(report))
    }

    /// Accept a suggestion into history.
    ///
    /// No-op (`None`) for empty outfits. The entry is appended locally and
    /// persisted before the best-effort remote insert; a remote failure is
    /// logged and the local entry stands.
    pub async fn accept(
        &mut self,
        suggestion: &OutfitSuggestion,
        favorite: bool,
    ) -> EngineResult<Option<Uuid>> {
        let Some(entry) = suggest::accept_suggestion(suggestion, favorite) else {
            return Ok(None);
        };
        let id = entry.id;
        let row = HistoryRow::from(&entry);
        self.history.push(entry);
        cache::store_history(&self.db, &self.history).await?;

        if let Some(remote) = &self.remote {
            if let Err(e) = remote.insert_history_entry(&row).await {
                warn!(entry_id = %id, error = %e, "Remote history insert failed, entry kept local");
            }
        }
        Ok(Some(id))
    }
}
