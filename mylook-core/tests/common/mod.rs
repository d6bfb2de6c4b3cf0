//! Shared test helpers: an in-memory remote store and fixture builders

// Not every test binary uses every helper.
#![allow(dead_code)]

use async_trait::async_trait;
use mylook_common::models::{Category, HistoryEntry, ImageRef, Season, WardrobeItem};
use mylook_common::rows::{HistoryRow, WardrobeRow};
use mylook_core::error::{EngineError, EngineResult};
use mylook_core::remote::{RemoteStore, UploadedImage};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// In-memory remote store with failure knobs and call counters
#[derive(Default)]
pub struct MockRemoteStore {
    pub wardrobe: Mutex<Vec<WardrobeRow>>,
    pub history: Mutex<Vec<HistoryRow>>,

    pub fail_wardrobe_fetch: AtomicBool,
    pub fail_history_fetch: AtomicBool,
    pub fail_history_batch: AtomicBool,
    pub fail_mutations: AtomicBool,
    /// Item names whose insert should fail
    pub fail_insert_names: Mutex<Vec<String>>,

    pub wardrobe_insert_attempts: AtomicUsize,
    pub history_batch_attempts: AtomicUsize,
    pub history_entry_inserts: AtomicUsize,
    pub upload_attempts: AtomicUsize,
    pub removed_images: Mutex<Vec<String>>,
    pub deleted_records: Mutex<Vec<Uuid>>,
    pub favorite_updates: Mutex<Vec<(Uuid, bool)>>,
}

impl MockRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn network_err(context: &str) -> EngineError {
        EngineError::Network(format!("{}: simulated failure", context))
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    async fn fetch_wardrobe(&self) -> EngineResult<Vec<WardrobeItem>> {
        if self.fail_wardrobe_fetch.load(Ordering::SeqCst) {
            return Err(Self::network_err("wardrobe fetch"));
        }
        let mut rows = self.wardrobe.lock().unwrap().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows.into_iter().map(WardrobeItem::from).collect())
    }

    async fn fetch_history(&self) -> EngineResult<Vec<HistoryEntry>> {
        if self.fail_history_fetch.load(Ordering::SeqCst) {
            return Err(Self::network_err("history fetch"));
        }
        let mut rows = self.history.lock().unwrap().clone();
        rows.sort_by(|a, b| a.accepted_at.cmp(&b.accepted_at));
        Ok(rows.into_iter().map(HistoryEntry::from).collect())
    }

    async fn insert_wardrobe_item(&self, row: &WardrobeRow) -> EngineResult<()> {
        self.wardrobe_insert_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_insert_names.lock().unwrap().contains(&row.name) {
            return Err(EngineError::Api(format!("insert rejected: {}", row.name)));
        }
        self.wardrobe.lock().unwrap().push(row.clone());
        Ok(())
    }

    async fn insert_history_entry(&self, row: &HistoryRow) -> EngineResult<()> {
        self.history_entry_inserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(Self::network_err("history insert"));
        }
        self.history.lock().unwrap().push(row.clone());
        Ok(())
    }

    async fn insert_history_batch(&self, rows: &[HistoryRow]) -> EngineResult<()> {
        self.history_batch_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_history_batch.load(Ordering::SeqCst) {
            return Err(Self::network_err("history batch insert"));
        }
        self.history.lock().unwrap().extend_from_slice(rows);
        Ok(())
    }

    async fn set_wardrobe_favorite(&self, id: Uuid, favorite: bool) -> EngineResult<()> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(Self::network_err("favorite update"));
        }
        self.favorite_updates.lock().unwrap().push((id, favorite));
        if let Some(row) = self.wardrobe.lock().unwrap().iter_mut().find(|r| r.id == id) {
            row.is_favorite = favorite;
        }
        Ok(())
    }

    async fn set_history_favorite(&self, id: Uuid, favorite: bool) -> EngineResult<()> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(Self::network_err("favorite update"));
        }
        self.favorite_updates.lock().unwrap().push((id, favorite));
        if let Some(row) = self.history.lock().unwrap().iter_mut().find(|r| r.id == id) {
            row.is_favorite = favorite;
        }
        Ok(())
    }

    async fn delete_wardrobe_item(&self, id: Uuid) -> EngineResult<()> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(Self::network_err("wardrobe delete"));
        }
        self.deleted_records.lock().unwrap().push(id);
        self.wardrobe.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }

    async fn upload_image(
        &self,
        _bytes: Vec<u8>,
        _mime: &str,
        ext: &str,
    ) -> EngineResult<UploadedImage> {
        let n = self.upload_attempts.fetch_add(1, Ordering::SeqCst);
        let path = format!("items/upload_{}.{}", n, ext);
        Ok(UploadedImage {
            url: format!("mock://bucket/{}", path),
            path,
        })
    }

    async fn remove_image(&self, path: &str) -> EngineResult<()> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(Self::network_err("image delete"));
        }
        self.removed_images.lock().unwrap().push(path.to_string());
        Ok(())
    }
}

/// Local wardrobe item with an inline photo, `offset_secs` in the past
pub fn local_item(name: &str, category: Category, offset_secs: i64) -> WardrobeItem {
    WardrobeItem {
        id: Uuid::new_v4(),
        name: name.to_string(),
        category,
        style_tags: vec!["casual".to_string()],
        season: Season::All,
        image: ImageRef::Inline("data:image/jpeg;base64,AQID".to_string()),
        is_favorite: false,
        created_at: chrono::Utc::now() - chrono::Duration::seconds(offset_secs),
    }
}

/// History entry accepted `offset_secs` in the past
pub fn local_entry(look_type: &str, offset_secs: i64) -> HistoryEntry {
    HistoryEntry {
        id: Uuid::new_v4(),
        accepted_at: chrono::Utc::now() - chrono::Duration::seconds(offset_secs),
        look_type: look_type.to_string(),
        outfit: vec![],
        context_summary: "Unknown, summer, unknown, ?C, day".to_string(),
        is_favorite: false,
    }
}

/// Open a throwaway cache database
pub async fn temp_cache() -> (tempfile::TempDir, sqlx::SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let pool = mylook_core::cache::open_cache(&dir.path().join("cache.db"))
        .await
        .unwrap();
    (dir, pool)
}
