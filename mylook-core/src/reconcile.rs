//! Local/remote reconciliation engine
//!
//! On startup each collection (wardrobe, history) independently runs the
//! same machine: fetch the remote collection, migrate local-only records
//! if the remote is empty, then refetch and treat the remote result as
//! authoritative — overwriting the in-memory view and the local cache.
//! The reconciled collection is never a field-level merge: it is freshly
//! migrated-then-refetched remote data, remote data as-is, or (on total
//! failure) local data as-is. Failures never propagate past this module;
//! they resolve to `DegradedLocal` with a human-readable status.

use crate::cache;
use crate::error::EngineResult;
use crate::media;
use crate::remote::RemoteStore;
use mylook_common::models::{HistoryEntry, ImageRef, WardrobeItem};
use mylook_common::rows::{HistoryRow, WardrobeRow};
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Per-collection reconciliation state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Unsynced,
    Fetching,
    EmptyRemote,
    PopulatedRemote,
    Migrating,
    Reconciled,
    DegradedLocal,
}

/// Outcome of reconciling one collection
#[derive(Debug, Clone)]
pub struct CollectionSync {
    pub state: SyncState,
    /// Human-readable status for display
    pub status: String,
    /// Records migrated to the remote store during this run
    pub migrated: usize,
    /// Records that failed to migrate (left local-only)
    pub failed: usize,
}

impl CollectionSync {
    fn degraded(status: impl Into<String>) -> Self {
        CollectionSync {
            state: SyncState::DegradedLocal,
            status: status.into(),
            migrated: 0,
            failed: 0,
        }
    }

    fn reconciled(migrated: usize, failed: usize) -> Self {
        let status = if failed > 0 {
            format!("Synced; {} item(s) left local-only", failed)
        } else {
            "Synced.".to_string()
        };
        CollectionSync {
            state: SyncState::Reconciled,
            status,
            migrated,
            failed,
        }
    }
}

/// Combined report for both collections
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub wardrobe: CollectionSync,
    pub history: CollectionSync,
}

/// Reconcile both collections against the remote store.
///
/// The collections are independent and run concurrently; each one's own
/// fetch → migrate → refetch sequence runs to completion without
/// interleaving with another pass over the same collection.
pub async fn reconcile_all(
    remote: &dyn RemoteStore,
    db: &SqlitePool,
) -> EngineResult<(Vec<WardrobeItem>, Vec<HistoryEntry>, SyncReport)> {
    let (wardrobe, history) =
        tokio::join!(reconcile_wardrobe(remote, db), reconcile_history(remote, db));
    let (wardrobe_items, wardrobe_sync) = wardrobe?;
    let (history_entries, history_sync) = history?;
    Ok((
        wardrobe_items,
        history_entries,
        SyncReport {
            wardrobe: wardrobe_sync,
            history: history_sync,
        },
    ))
}

/// Reconcile the wardrobe collection.
///
/// Migration is partial-failure tolerant: one item's upload or insert
/// failure is logged and skipped, leaving that item local-only until the
/// next sync attempt.
pub async fn reconcile_wardrobe(
    remote: &dyn RemoteStore,
    db: &SqlitePool,
) -> EngineResult<(Vec<WardrobeItem>, CollectionSync)> {
    let local = cache::load_wardrobe(db).await?;

    let remote_items = match remote.fetch_wardrobe().await {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "Wardrobe fetch failed, using local cache");
            return Ok((local, CollectionSync::degraded("Sync failed. Working locally.")));
        }
    };

    let mut migrated = 0usize;
    let mut failed = 0usize;
    if remote_items.is_empty() && !local.is_empty() {
        info!(count = local.len(), "Remote wardrobe empty, migrating local items");
        for item in &local {
            match migrate_wardrobe_item(remote, item).await {
                Ok(()) => migrated += 1,
                Err(e) => {
                    warn!(item_id = %item.id, error = %e, "Item migration failed, skipping");
                    failed += 1;
                }
            }
        }
    }

    // Refetch and treat the remote result as authoritative.
    let reconciled = match remote.fetch_wardrobe().await {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "Wardrobe refetch failed, using local cache");
            return Ok((local, CollectionSync::degraded("Sync failed. Working locally.")));
        }
    };
    cache::store_wardrobe(db, &reconciled).await?;
    Ok((reconciled, CollectionSync::reconciled(migrated, failed)))
}

/// Upload the item's inline image (when it has one) and insert the row
async fn migrate_wardrobe_item(
    remote: &dyn RemoteStore,
    item: &WardrobeItem,
) -> EngineResult<()> {
    let mut row = WardrobeRow::from(item);
    if let ImageRef::Inline(data_url) = &item.image {
        let inline = media::decode_data_url(data_url)?;
        let ext = inline.extension();
        let mime = inline.mime.clone();
        let uploaded = remote.upload_image(inline.bytes, &mime, ext).await?;
        row.image_url = uploaded.url;
        row.image_path = uploaded.path;
    }
    remote.insert_wardrobe_item(&row).await
}

/// Reconcile the history collection.
///
/// Migration is a single bulk insert; a bulk failure leaves the session on
/// local history (degraded) rather than partially migrating.
pub async fn reconcile_history(
    remote: &dyn RemoteStore,
    db: &SqlitePool,
) -> EngineResult<(Vec<HistoryEntry>, CollectionSync)> {
    let local = cache::load_history(db).await?;

    let remote_entries = match remote.fetch_history().await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "History fetch failed, using local cache");
            return Ok((local, CollectionSync::degraded("Sync failed. Working locally.")));
        }
    };

    let mut migrated = 0usize;
    if remote_entries.is_empty() && !local.is_empty() {
        info!(count = local.len(), "Remote history empty, migrating local entries");
        let rows: Vec<HistoryRow> = local.iter().map(HistoryRow::from).collect();
        match remote.insert_history_batch(&rows).await {
            Ok(()) => migrated = rows.len(),
            Err(e) => {
                warn!(error = %e, "History bulk insert failed, keeping local history");
                return Ok((
                    local,
                    CollectionSync::degraded("History migration failed. Working locally."),
                ));
            }
        }
    }

    let reconciled = match remote.fetch_history().await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "History refetch failed, using local cache");
            return Ok((local, CollectionSync::degraded("Sync failed. Working locally.")));
        }
    };
    cache::store_history(db, &reconciled).await?;
    Ok((reconciled, CollectionSync::reconciled(migrated, 0)))
}
