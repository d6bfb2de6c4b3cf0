//! Remote store client
//!
//! The remote store is an external collaborator holding the two record
//! collections (`wardrobe_items`, `history_entries`) and a blob bucket for
//! item photos. The `RemoteStore` trait is the seam the reconciliation
//! engine and the mutations are written against; `SupabaseStore` is the
//! production implementation over the PostgREST and Storage REST APIs.

use crate::error::{EngineError, EngineResult};
use async_trait::async_trait;
use mylook_common::models::{HistoryEntry, WardrobeItem};
use mylook_common::rows::{HistoryRow, WardrobeRow};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Timeout for remote store requests
const REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a blob upload
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Publicly resolvable URL
    pub url: String,
    /// Bucket path, recorded for later deletion
    pub path: String,
}

/// Ordered CRUD surface the engines rely on.
///
/// Ordering is part of the contract: wardrobe newest first, history oldest
/// first — downstream components use it as the default display order.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All wardrobe items, created_at descending
    async fn fetch_wardrobe(&self) -> EngineResult<Vec<WardrobeItem>>;

    /// All history entries, accepted_at ascending
    async fn fetch_history(&self) -> EngineResult<Vec<HistoryEntry>>;

    async fn insert_wardrobe_item(&self, row: &WardrobeRow) -> EngineResult<()>;

    async fn insert_history_entry(&self, row: &HistoryRow) -> EngineResult<()>;

    /// Single bulk insert; all-or-nothing from the caller's perspective
    async fn insert_history_batch(&self, rows: &[HistoryRow]) -> EngineResult<()>;

    async fn set_wardrobe_favorite(&self, id: Uuid, favorite: bool) -> EngineResult<()>;

    async fn set_history_favorite(&self, id: Uuid, favorite: bool) -> EngineResult<()>;

    async fn delete_wardrobe_item(&self, id: Uuid) -> EngineResult<()>;

    /// Upload photo bytes; the store generates the path
    async fn upload_image(&self, bytes: Vec<u8>, mime: &str, ext: &str)
        -> EngineResult<UploadedImage>;

    async fn remove_image(&self, path: &str) -> EngineResult<()>;
}

/// Supabase-backed remote store
pub struct SupabaseStore {
    http_client: Client,
    base_url: String,
    bucket: String,
}

impl SupabaseStore {
    pub fn new(base_url: String, api_key: String, bucket: String) -> Self {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&api_key) {
            headers.insert("apikey", value);
        }
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", api_key)) {
            headers.insert(AUTHORIZATION, value);
        }

        Self {
            http_client: Client::builder()
                .timeout(REMOTE_TIMEOUT)
                .default_headers(headers)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket,
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path)
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }

    async fn check(response: reqwest::Response, context: &str) -> EngineResult<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            Err(EngineError::Api(format!(
                "{} returned {}: {}",
                context, status, snippet
            )))
        }
    }
}

#[async_trait]
impl RemoteStore for SupabaseStore {
    async fn fetch_wardrobe(&self) -> EngineResult<Vec<WardrobeItem>> {
        debug!("Fetching remote wardrobe");
        let response = self
            .http_client
            .get(self.rest_url("wardrobe_items"))
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await
            .map_err(|e| EngineError::from_reqwest("wardrobe fetch", e))?;
        let response = Self::check(response, "wardrobe fetch").await?;
        let rows: Vec<WardrobeRow> = response
            .json()
            .await
            .map_err(|e| EngineError::Parse(format!("wardrobe rows: {}", e)))?;
        Ok(rows.into_iter().map(WardrobeItem::from).collect())
    }

    async fn fetch_history(&self) -> EngineResult<Vec<HistoryEntry>> {
        debug!("Fetching remote history");
        let response = self
            .http_client
            .get(self.rest_url("history_entries"))
            .query(&[("select", "*"), ("order", "accepted_at.asc")])
            .send()
            .await
            .map_err(|e| EngineError::from_reqwest("history fetch", e))?;
        let response = Self::check(response, "history fetch").await?;
        let rows: Vec<HistoryRow> = response
            .json()
            .await
            .map_err(|e| EngineError::Parse(format!("history rows: {}", e)))?;
        Ok(rows.into_iter().map(HistoryEntry::from).collect())
    }

    async fn insert_wardrobe_item(&self, row: &WardrobeRow) -> EngineResult<()> {
        let response = self
            .http_client
            .post(self.rest_url("wardrobe_items"))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await
            .map_err(|e| EngineError::from_reqwest("wardrobe insert", e))?;
        Self::check(response, "wardrobe insert").await?;
        Ok(())
    }

    async fn insert_history_entry(&self, row: &HistoryRow) -> EngineResult<()> {
        self.insert_history_batch(std::slice::from_ref(row)).await
    }

    async fn insert_history_batch(&self, rows: &[HistoryRow]) -> EngineResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let response = self
            .http_client
            .post(self.rest_url("history_entries"))
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await
            .map_err(|e| EngineError::from_reqwest("history insert", e))?;
        Self::check(response, "history insert").await?;
        Ok(())
    }

    async fn set_wardrobe_favorite(&self, id: Uuid, favorite: bool) -> EngineResult<()> {
        let response = self
            .http_client
            .patch(self.rest_url("wardrobe_items"))
            .query(&[("id", format!("eq.{}", id))])
            .json(&serde_json::json!({ "is_favorite": favorite }))
            .send()
            .await
            .map_err(|e| EngineError::from_reqwest("wardrobe favorite update", e))?;
        Self::check(response, "wardrobe favorite update").await?;
        Ok(())
    }

    async fn set_history_favorite(&self, id: Uuid, favorite: bool) -> EngineResult<()> {
        let response = self
            .http_client
            .patch(self.rest_url("history_entries"))
            .query(&[("id", format!("eq.{}", id))])
            .json(&serde_json::json!({ "is_favorite": favorite }))
            .send()
            .await
            .map_err(|e| EngineError::from_reqwest("history favorite update", e))?;
        Self::check(response, "history favorite update").await?;
        Ok(())
    }

    async fn delete_wardrobe_item(&self, id: Uuid) -> EngineResult<()> {
        let response = self
            .http_client
            .delete(self.rest_url("wardrobe_items"))
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await
            .map_err(|e| EngineError::from_reqwest("wardrobe delete", e))?;
        Self::check(response, "wardrobe delete").await?;
        Ok(())
    }

    async fn upload_image(
        &self,
        bytes: Vec<u8>,
        mime: &str,
        ext: &str,
    ) -> EngineResult<UploadedImage> {
        let path = generate_image_path(ext);
        debug!(path = %path, "Uploading item image");
        let response = self
            .http_client
            .post(self.object_url(&path))
            .header("Content-Type", mime)
            .body(bytes)
            .send()
            .await
            .map_err(|e| EngineError::from_reqwest("image upload", e))?;
        Self::check(response, "image upload").await?;
        Ok(UploadedImage {
            url: self.public_url(&path),
            path,
        })
    }

    async fn remove_image(&self, path: &str) -> EngineResult<()> {
        let response = self
            .http_client
            .delete(self.object_url(path))
            .send()
            .await
            .map_err(|e| EngineError::from_reqwest("image delete", e))?;
        Self::check(response, "image delete").await?;
        Ok(())
    }
}

/// Generated bucket path: `items/<unix-millis>_<uuid>.<ext>`
fn generate_image_path(ext: &str) -> String {
    let millis = mylook_common::time::now().timestamp_millis();
    format!("items/{}_{}.{}", millis, Uuid::new_v4(), ext)
}
