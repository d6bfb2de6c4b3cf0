//! Data-sanitization helpers
//!
//! Shared by record ingestion (remote rows, AI analysis output) and the
//! suggestion engine. All helpers correct instead of reject: bad input
//! yields a usable default.

use crate::models::WardrobeItem;
use std::collections::HashSet;
use uuid::Uuid;

/// Maximum number of style tags kept per item
pub const MAX_STYLE_TAGS: usize = 8;

/// Remove duplicate items by id, keeping the first occurrence.
///
/// Order preserving and idempotent.
pub fn dedupe_by_id(items: &[WardrobeItem]) -> Vec<WardrobeItem> {
    let mut seen: HashSet<Uuid> = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(item.id))
        .cloned()
        .collect()
}

/// Trim an item name; empty input becomes "Untitled item"
pub fn sanitize_name(value: &str) -> String {
    let cleaned = value.trim();
    if cleaned.is_empty() {
        "Untitled item".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Trim tags, drop empties, clamp to `MAX_STYLE_TAGS`
pub fn sanitize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .take(MAX_STYLE_TAGS)
        .collect()
}

/// Coerce free-form model output into a parseable JSON string.
///
/// Accepts raw JSON, JSON inside a ```json fence, or JSON embedded in
/// surrounding prose (first `{` to last `}`). Degenerate input is returned
/// trimmed; the caller sees the resulting parse error.
pub fn normalize_json_text(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        return trimmed.to_string();
    }
    if let Some(inner) = extract_fenced_block(trimmed) {
        return inner;
    }
    if let (Some(first), Some(last)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if last > first {
            return trimmed[first..=last].to_string();
        }
    }
    trimmed.to_string()
}

/// Contents of the first ``` fence; a `json` language tag (any case) on
/// the fence is stripped
fn extract_fenced_block(text: &str) -> Option<String> {
    let start = text.find("```")?;
    let mut body = &text[start + 3..];
    if let Some(tag) = body.get(..4) {
        if tag.eq_ignore_ascii_case("json") {
            body = &body[4..];
        }
    }
    let end = body.find("```")?;
    let inner = body[..end].trim();
    if inner.is_empty() {
        None
    } else {
        Some(inner.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, ImageRef, Season};
    use chrono::Utc;

    fn item(id: Uuid, name: &str) -> WardrobeItem {
        WardrobeItem {
            id,
            name: name.to_string(),
            category: Category::Tops,
            style_tags: vec![],
            season: Season::All,
            image: ImageRef::default(),
            is_favorite: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn dedupe_keeps_first_occurrence_in_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let items = vec![item(a, "first-a"), item(b, "b"), item(a, "second-a")];
        let deduped = dedupe_by_id(&items);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].name, "first-a");
        assert_eq!(deduped[1].name, "b");
    }

    #[test]
    fn dedupe_is_idempotent() {
        let a = Uuid::new_v4();
        let items = vec![item(a, "x"), item(a, "y"), item(Uuid::new_v4(), "z")];
        let once = dedupe_by_id(&items);
        let twice = dedupe_by_id(&once);
        assert_eq!(once.len(), twice.len());
        let once_ids: Vec<_> = once.iter().map(|i| i.id).collect();
        let twice_ids: Vec<_> = twice.iter().map(|i| i.id).collect();
        assert_eq!(once_ids, twice_ids);
    }

    #[test]
    fn name_sanitizer_defaults_empty_input() {
        assert_eq!(sanitize_name("  Wool coat "), "Wool coat");
        assert_eq!(sanitize_name("   "), "Untitled item");
        assert_eq!(sanitize_name(""), "Untitled item");
    }

    #[test]
    fn tags_are_trimmed_and_clamped() {
        let tags: Vec<String> = (0..12).map(|i| format!(" tag{} ", i)).collect();
        let cleaned = sanitize_tags(tags);
        assert_eq!(cleaned.len(), MAX_STYLE_TAGS);
        assert_eq!(cleaned[0], "tag0");

        let cleaned = sanitize_tags(vec!["  ".to_string(), "bold".to_string()]);
        assert_eq!(cleaned, vec!["bold".to_string()]);
    }

    #[test]
    fn normalize_passes_raw_json_through() {
        assert_eq!(normalize_json_text(r#"{"a":1}"#), r#"{"a":1}"#);
        assert_eq!(normalize_json_text("  {\"a\":1}  "), r#"{"a":1}"#);
    }

    #[test]
    fn normalize_unwraps_fenced_json() {
        assert_eq!(
            normalize_json_text("```json\n{\"a\":1}\n```"),
            r#"{"a":1}"#
        );
        assert_eq!(normalize_json_text("```\n{\"a\":1}\n```"), r#"{"a":1}"#);
    }

    #[test]
    fn fence_language_tag_matches_any_case() {
        assert_eq!(
            normalize_json_text("```Json\n{\"a\":1}\n```"),
            r#"{"a":1}"#
        );
        assert_eq!(
            normalize_json_text("```JSON\n{\"a\":1}\n```"),
            r#"{"a":1}"#
        );
    }

    #[test]
    fn normalize_extracts_json_from_prose() {
        assert_eq!(
            normalize_json_text(r#"Sure! {"a":1} thanks."#),
            r#"{"a":1}"#
        );
    }

    #[test]
    fn normalize_returns_unparseable_text_unchanged() {
        let out = normalize_json_text("not json at all");
        assert_eq!(out, "not json at all");
        assert!(serde_json::from_str::<serde_json::Value>(&out).is_err());
    }
}
