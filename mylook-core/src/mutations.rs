//! Local-first wardrobe and history mutations
//!
//! Every mutation applies locally and persists to the cache before the
//! best-effort remote call. A remote failure is logged and the local
//! change stands — local state may diverge from remote until the next
//! full reconciliation. This is deliberate, not a bug to transactionalize.

use crate::cache;
use crate::error::EngineResult;
use crate::media;
use crate::remote::RemoteStore;
use mylook_common::models::{
    Category, HistoryEntry, ImageRef, Season, WardrobeItem,
};
use mylook_common::rows::WardrobeRow;
use mylook_common::sanitize;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

/// Flip the favorite flag on a wardrobe item.
///
/// Returns the new flag value, or `None` when the id is unknown.
pub async fn toggle_wardrobe_favorite(
    items: &mut Vec<WardrobeItem>,
    id: Uuid,
    db: &SqlitePool,
    remote: Option<&dyn RemoteStore>,
) -> EngineResult<Option<bool>> {
    let Some(item) = items.iter_mut().find(|item| item.id == id) else {
        return Ok(None);
    };
    item.is_favorite = !item.is_favorite;
    let flag = item.is_favorite;

    cache::store_wardrobe(db, items).await?;

    if let Some(remote) = remote {
        if let Err(e) = remote.set_wardrobe_favorite(id, flag).await {
            warn!(item_id = %id, error = %e, "Remote favorite update failed, keeping local flip");
        }
    }
    Ok(Some(flag))
}

/// Flip the favorite flag on a history entry
pub async fn toggle_history_favorite(
    entries: &mut Vec<HistoryEntry>,
    id: Uuid,
    db: &SqlitePool,
    remote: Option<&dyn RemoteStore>,
) -> EngineResult<Option<bool>> {
    let Some(entry) = entries.iter_mut().find(|entry| entry.id == id) else {
        return Ok(None);
    };
    entry.is_favorite = !entry.is_favorite;
    let flag = entry.is_favorite;

    cache::store_history(db, entries).await?;

    if let Some(remote) = remote {
        if let Err(e) = remote.set_history_favorite(id, flag).await {
            warn!(entry_id = %id, error = %e, "Remote favorite update failed, keeping local flip");
        }
    }
    Ok(Some(flag))
}

/// Delete a wardrobe item: remove locally first, then best-effort remove
/// the stored blob and the remote record. Never rolled back.
pub async fn delete_wardrobe_item(
    items: &mut Vec<WardrobeItem>,
    id: Uuid,
    db: &SqlitePool,
    remote: Option<&dyn RemoteStore>,
) -> EngineResult<bool> {
    let Some(position) = items.iter().position(|item| item.id == id) else {
        return Ok(false);
    };
    let removed = items.remove(position);
    cache::store_wardrobe(db, items).await?;

    if let Some(remote) = remote {
        if let Some(path) = removed.image.storage_path() {
            if let Err(e) = remote.remove_image(path).await {
                warn!(item_id = %id, error = %e, "Remote image delete failed");
            }
        }
        if let Err(e) = remote.delete_wardrobe_item(id).await {
            warn!(item_id = %id, error = %e, "Remote record delete failed");
        }
    }
    Ok(true)
}

/// Fields for a new wardrobe item
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub category: Category,
    pub style_tags: Vec<String>,
    pub season: Season,
    /// Inline photo as a data URL
    pub image_data_url: String,
}

/// Add a wardrobe item: sanitize, upload the (resized) photo when a
/// remote store is available, insert the row, and prepend to the wardrobe
/// (newest first). A remote failure keeps the inline local item.
pub async fn add_wardrobe_item(
    items: &mut Vec<WardrobeItem>,
    new_item: NewItem,
    db: &SqlitePool,
    remote: Option<&dyn RemoteStore>,
) -> EngineResult<Uuid> {
    let mut item = WardrobeItem {
        id: Uuid::new_v4(),
        name: sanitize::sanitize_name(&new_item.name),
        category: new_item.category,
        style_tags: sanitize::sanitize_tags(new_item.style_tags),
        season: new_item.season,
        image: ImageRef::Inline(new_item.image_data_url),
        is_favorite: false,
        created_at: mylook_common::time::now(),
    };

    if let Some(remote) = remote {
        match upload_inline_image(remote, &item).await {
            Ok(image) => {
                item.image = image;
                if let Err(e) = remote.insert_wardrobe_item(&WardrobeRow::from(&item)).await {
                    warn!(item_id = %item.id, error = %e, "Remote insert failed, item kept local-only");
                }
            }
            Err(e) => {
                warn!(item_id = %item.id, error = %e, "Image upload failed, item kept local-only");
            }
        }
    }

    let id = item.id;
    items.insert(0, item);
    cache::store_wardrobe(db, items).await?;
    Ok(id)
}

/// Resize and upload an inline photo, yielding the remote reference
async fn upload_inline_image(
    remote: &dyn RemoteStore,
    item: &WardrobeItem,
) -> EngineResult<ImageRef> {
    let ImageRef::Inline(data_url) = &item.image else {
        return Ok(item.image.clone());
    };
    let inline = media::decode_data_url(data_url)?;
    let resized = media::resize_for_upload(inline, media::MAX_UPLOAD_SIDE);
    let ext = resized.extension();
    let mime = resized.mime.clone();
    let uploaded = remote.upload_image(resized.bytes, &mime, ext).await?;
    Ok(ImageRef::Remote {
        url: uploaded.url,
        path: uploaded.path,
    })
}
