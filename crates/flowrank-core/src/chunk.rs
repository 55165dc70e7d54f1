//! Chunk data model.
//!
//! A chunk is one retrievable unit of content. Besides the fields the
//! pipeline reasons about (id, grouping, timestamp, per-source scores),
//! everything the search layer attached is carried through untouched in
//! a flattened map.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Timestamp assigned to chunks with a missing or unparseable `updated_at`.
/// Old enough to lose every "latest" comparison.
pub static SENTINEL_TIMESTAMP: Lazy<NaiveDateTime> = Lazy::new(|| {
    NaiveDate::from_ymd_opt(1900, 1, 1)
        .expect("valid sentinel date")
        .and_hms_opt(0, 0, 0)
        .expect("valid sentinel time")
});

/// Which retrieval pass produced a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkSource {
    Lexical,
    Semantic,
}

/// One retrievable unit of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Identity for deduplication and LLM round-trips.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Event/document grouping identifier. Falls back to `id` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// ISO-8601 timestamp of the last update to the parent event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lexical_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ChunkSource>,
    /// Remaining fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Chunk {
    /// Grouping key for temporal windowing: first non-null of
    /// `event_id`, `id`. Chunks with neither cannot be grouped.
    pub fn group_id(&self) -> Option<&str> {
        self.event_id.as_deref().or(self.id.as_deref())
    }

    /// Parsed `updated_at`, or the sentinel when absent or malformed.
    pub fn updated_timestamp(&self) -> NaiveDateTime {
        self.updated_at
            .as_deref()
            .and_then(parse_iso_timestamp)
            .unwrap_or(*SENTINEL_TIMESTAMP)
    }

    /// Chunk body text: first non-empty of `text`, `page_content`.
    pub fn text(&self) -> &str {
        for key in ["text", "page_content"] {
            if let Some(s) = self.extra.get(key).and_then(Value::as_str) {
                if !s.is_empty() {
                    return s;
                }
            }
        }
        ""
    }

    /// String-valued passthrough field, if present.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

/// Parse an ISO-8601 timestamp, accepting a bare date or a full datetime
/// with optional fractional seconds.
pub fn parse_iso_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chunk_from(value: Value) -> Chunk {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_group_id_prefers_event_id() {
        let chunk = chunk_from(json!({"id": "c1", "event_id": "e1"}));
        assert_eq!(chunk.group_id(), Some("e1"));

        let chunk = chunk_from(json!({"id": "c1"}));
        assert_eq!(chunk.group_id(), Some("c1"));

        let chunk = chunk_from(json!({"text": "no ids"}));
        assert_eq!(chunk.group_id(), None);
    }

    #[test]
    fn test_updated_timestamp_sentinel() {
        let chunk = chunk_from(json!({"id": "c1"}));
        assert_eq!(chunk.updated_timestamp(), *SENTINEL_TIMESTAMP);

        let chunk = chunk_from(json!({"id": "c1", "updated_at": "not a date"}));
        assert_eq!(chunk.updated_timestamp(), *SENTINEL_TIMESTAMP);
    }

    #[test]
    fn test_updated_timestamp_formats() {
        let chunk = chunk_from(json!({"id": "c1", "updated_at": "2024-06-04T10:00:00"}));
        assert_eq!(
            chunk.updated_timestamp(),
            NaiveDate::from_ymd_opt(2024, 6, 4)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap()
        );

        let chunk = chunk_from(json!({"id": "c1", "updated_at": "2024-05-20"}));
        assert_eq!(
            chunk.updated_timestamp(),
            NaiveDate::from_ymd_opt(2024, 5, 20)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_text_fallback() {
        let chunk = chunk_from(json!({"page_content": "body"}));
        assert_eq!(chunk.text(), "body");

        let chunk = chunk_from(json!({"text": "primary", "page_content": "secondary"}));
        assert_eq!(chunk.text(), "primary");

        let chunk = chunk_from(json!({"id": "c1"}));
        assert_eq!(chunk.text(), "");
    }

    #[test]
    fn test_passthrough_fields_survive_round_trip() {
        let value = json!({
            "id": "c1",
            "classification": "minutes",
            "summary": "quarterly review",
            "lexical_score": 0.9
        });
        let chunk = chunk_from(value);
        assert_eq!(chunk.extra_str("classification"), Some("minutes"));

        let back = serde_json::to_value(&chunk).unwrap();
        assert_eq!(back["summary"], "quarterly review");
        assert_eq!(back["lexical_score"], 0.9);
    }
}
