//! AI stylist backend client
//!
//! Talks to a text/vision completion backend (OpenAI responses API) for
//! two request types: "choose an outfit" from a wardrobe projection and
//! "analyze a photo" into structured item attributes. The response body's
//! free text is coerced into strict JSON before decoding; decoding is a
//! tagged result, never a panic.
//!
//! Model names form an ordered fallback list tried in sequence until one
//! yields a decodable result.

use crate::error::{EngineError, EngineResult};
use mylook_common::models::{Category, Context, Season, WardrobeItem};
use mylook_common::sanitize;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

/// OpenAI responses endpoint
const OPENAI_RESPONSES_URL: &str = "https://api.openai.com/v1/responses";

/// Timeout for stylist requests
const STYLIST_TIMEOUT: Duration = Duration::from_secs(10);

/// Secondary model tried when the configured one fails
const SECONDARY_MODEL: &str = "gpt-4.1";

/// Token budgets for the two request types
const CHOOSE_MAX_TOKENS: u32 = 400;
const ANALYZE_MAX_TOKENS: u32 = 300;

/// Reduced wardrobe projection sent to the stylist (never image bytes)
#[derive(Debug, Clone, Serialize)]
pub struct WardrobeProjection {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub season: Season,
    pub style_tags: Vec<String>,
}

impl From<&WardrobeItem> for WardrobeProjection {
    fn from(item: &WardrobeItem) -> Self {
        WardrobeProjection {
            id: item.id.to_string(),
            name: item.name.clone(),
            category: item.category,
            season: item.season,
            style_tags: item.style_tags.clone(),
        }
    }
}

/// Outfit selection decoded from the stylist response
#[derive(Debug, Clone, Deserialize)]
pub struct StylistSelection {
    #[serde(rename = "selectedItemIds", default)]
    pub selected_item_ids: Vec<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Item attributes decoded from a photo analysis, already sanitized
#[derive(Debug, Clone)]
pub struct ItemAnalysis {
    pub name: String,
    pub category: Category,
    pub style_tags: Vec<String>,
    pub season: Season,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    name: Option<String>,
    category: Option<String>,
    #[serde(rename = "styleTags", default)]
    style_tags: Vec<String>,
    season: Option<String>,
    reason: Option<String>,
}

impl From<RawAnalysis> for ItemAnalysis {
    fn from(raw: RawAnalysis) -> Self {
        ItemAnalysis {
            name: sanitize::sanitize_name(raw.name.as_deref().unwrap_or("")),
            category: Category::parse_or_default(raw.category.as_deref().unwrap_or("")),
            style_tags: sanitize::sanitize_tags(raw.style_tags),
            season: Season::parse_or_default(raw.season.as_deref().unwrap_or("")),
            reason: raw.reason.map(|r| r.trim().to_string()).unwrap_or_default(),
        }
    }
}

/// Client for the stylist backend
pub struct StylistClient {
    http_client: Client,
    base_url: String,
    api_key: String,
    /// Ordered model fallback list, first entry tried first
    models: Vec<String>,
}

impl StylistClient {
    /// Build a client; the configured model is tried before the secondary
    pub fn new(api_key: String, model: String) -> Self {
        let mut models = vec![model];
        if models[0] != SECONDARY_MODEL {
            models.push(SECONDARY_MODEL.to_string());
        }
        Self::with_base_url(api_key, models, OPENAI_RESPONSES_URL.to_string())
    }

    /// Override endpoint and model list (tests point this at a local
    /// listener or an unroutable port)
    pub fn with_base_url(api_key: String, models: Vec<String>, base_url: String) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(STYLIST_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            base_url,
            api_key,
            models,
        }
    }

    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Ask the stylist to choose an outfit from the wardrobe projection
    pub async fn choose_outfit(
        &self,
        wardrobe: &[WardrobeProjection],
        look_type: &str,
        context: &Context,
    ) -> EngineResult<StylistSelection> {
        let prompt = [
            "You are a personal stylist.".to_string(),
            "Choose one outfit from the user wardrobe.".to_string(),
            "Return ONLY valid JSON:".to_string(),
            r#"{"selectedItemIds":["id1","id2"],"reason":"..."}"#.to_string(),
            "Constraints:".to_string(),
            "- include shoes if available".to_string(),
            "- include accessories if matching".to_string(),
            "- use season/weather/time context".to_string(),
            "- match requested look type".to_string(),
            format!("lookType: {}", look_type),
            format!("context: {}", serde_json::to_string(context).unwrap_or_default()),
            format!("wardrobe: {}", serde_json::to_string(wardrobe).unwrap_or_default()),
        ]
        .join("\n");

        self.request_decoded(move |model| {
            json!({
                "model": model,
                "input": prompt.clone(),
                "max_output_tokens": CHOOSE_MAX_TOKENS,
            })
        })
        .await
    }

    /// Analyze a clothing photo into structured item attributes
    pub async fn analyze_item(&self, image_data_url: &str) -> EngineResult<ItemAnalysis> {
        let instruction = concat!(
            "Analyze this clothing image and return only JSON with this shape: ",
            r#"{"name":"...","category":"tops|bottoms|outerwear|dresses|shoes|accessories","#,
            r#""styleTags":["..."],"season":"all|spring|summer|autumn|winter","reason":"..."}"#
        );
        let image = image_data_url.to_string();

        let raw: RawAnalysis = self
            .request_decoded(move |model| {
                json!({
                    "model": model,
                    "input": [{
                        "role": "user",
                        "content": [
                            { "type": "input_text", "text": instruction },
                            { "type": "input_image", "image_url": image.clone() },
                        ],
                    }],
                    "max_output_tokens": ANALYZE_MAX_TOKENS,
                })
            })
            .await?;

        Ok(ItemAnalysis::from(raw))
    }

    /// Try each model in order until one yields a decodable result
    async fn request_decoded<T, F>(&self, build_body: F) -> EngineResult<T>
    where
        T: serde::de::DeserializeOwned,
        F: Fn(&str) -> serde_json::Value,
    {
        let mut last_error = EngineError::Api("No stylist models configured".to_string());
        for model in &self.models {
            match self.request_once(model, build_body(model)).await {
                Ok(decoded) => return Ok(decoded),
                Err(e) => {
                    warn!(model = %model, error = %e, "Stylist model attempt failed");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    async fn request_once<T>(&self, model: &str, body: serde_json::Value) -> EngineResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        debug!(model, "Sending stylist request");

        let response = self
            .http_client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::from_reqwest("stylist request", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(EngineError::Api(format!(
                "Stylist backend returned {}: {}",
                status, snippet
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| EngineError::Parse(format!("Stylist response body: {}", e)))?;

        let raw_text = extract_response_text(&payload);
        let json_text = sanitize::normalize_json_text(&raw_text);
        if json_text.is_empty() {
            return Err(EngineError::Parse("Stylist returned no text".to_string()));
        }

        serde_json::from_str(&json_text)
            .map_err(|e| EngineError::Parse(format!("Stylist JSON: {}", e)))
    }
}

/// Pull the model's output text out of a responses-API payload.
///
/// Handles both the flattened `output_text` convenience field and the
/// structured `output[].content[]` form.
pub fn extract_response_text(payload: &serde_json::Value) -> String {
    if let Some(text) = payload.get("output_text").and_then(|v| v.as_str()) {
        return text.to_string();
    }

    let mut parts: Vec<&str> = Vec::new();
    if let Some(output) = payload.get("output").and_then(|v| v.as_array()) {
        for entry in output {
            let Some(content) = entry.get("content").and_then(|v| v.as_array()) else {
                continue;
            };
            for chunk in content {
                if chunk.get("type").and_then(|v| v.as_str()) == Some("output_text") {
                    if let Some(text) = chunk.get("text").and_then(|v| v.as_str()) {
                        parts.push(text);
                    }
                }
            }
        }
    }
    parts.join("\n").trim().to_string()
}
