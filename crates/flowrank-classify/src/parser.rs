//! Classifier output parsing.
//!
//! The upstream classifier call wraps its record as
//! `{"results": {"messages": [{"content": {...}}]}}`. Parsing never
//! fails: missing or malformed structure degrades to a defaults-filled
//! record with a descriptive status, because downstream stages cannot
//! tolerate missing keys.

use serde_json::Value;
use tracing::{debug, warn};

use flowrank_core::json::extract_json_object;
use flowrank_core::{Error, Result};

use crate::types::{Category, ClassifierRecord};

/// Outcome of parsing one classifier payload.
#[derive(Debug, Clone)]
pub struct ParsedClassifier {
    pub record: ClassifierRecord,
    pub status: String,
}

impl ParsedClassifier {
    fn degraded(status: impl Into<String>) -> Self {
        let status = status.into();
        warn!("Classifier parse degraded: {status}");
        Self {
            record: ClassifierRecord::default(),
            status,
        }
    }
}

/// Parse a raw classifier payload into a defaults-filled record.
pub fn parse_classifier_output(input: &Value) -> ParsedClassifier {
    let root = match resolve_object(input) {
        Ok(root) => root,
        Err(status) => return ParsedClassifier::degraded(status),
    };

    let content = match navigate_content(&root) {
        Some(content) => content,
        None => {
            return ParsedClassifier::degraded(
                "'results.messages[0].content' is missing or not an object",
            )
        }
    };

    let record = record_from_content(content);
    debug!(
        "Classifier parsed: {} active categories",
        record.active_categories.len()
    );
    ParsedClassifier {
        record,
        status: "classifier output parsed".into(),
    }
}

/// Check that a classifier content object carries every required field
/// with the expected shape. Reported, never panicked.
pub fn validate_record(content: &Value) -> Result<()> {
    let obj = content
        .as_object()
        .ok_or_else(|| Error::Parse("classifier content is not an object".into()))?;

    for field in [
        "message",
        "active_categories",
        "focus",
        "rerank_weights",
        "search_instruction",
        "temporal_constraints",
    ] {
        if !obj.contains_key(field) {
            return Err(Error::Parse(format!("required field '{field}' is missing")));
        }
    }

    if !obj["active_categories"].is_array() {
        return Err(Error::Parse("'active_categories' must be a list".into()));
    }
    let weights = obj["rerank_weights"]
        .as_object()
        .ok_or_else(|| Error::Parse("'rerank_weights' must be an object".into()))?;
    if !weights.contains_key("lexical") || !weights.contains_key("semantic") {
        return Err(Error::Parse(
            "'rerank_weights' must contain 'lexical' and 'semantic'".into(),
        ));
    }
    if !obj["search_instruction"].is_object() {
        return Err(Error::Parse("'search_instruction' must be an object".into()));
    }

    Ok(())
}

/// Resolve the input to a JSON object: direct object, or a string that
/// parses (possibly with narration/fences) to one.
fn resolve_object(input: &Value) -> std::result::Result<Value, String> {
    match input {
        Value::Object(_) => Ok(input.clone()),
        Value::String(s) => extract_json_object(s)
            .map_err(|_| format!("input string is not valid JSON: {}", truncate(s, 200))),
        other => Err(format!(
            "unsupported classifier input: {}",
            truncate(&other.to_string(), 200)
        )),
    }
}

fn navigate_content(root: &Value) -> Option<&Value> {
    let content = root.get("results")?.get("messages")?.get(0)?.get("content")?;
    content.is_object().then_some(content)
}

/// Build the record field by field so a single malformed field degrades
/// to its default instead of failing the whole record.
fn record_from_content(content: &Value) -> ClassifierRecord {
    let mut record = ClassifierRecord::default();

    if let Some(s) = content.get("message").and_then(Value::as_str) {
        record.message = s.to_string();
    }
    if let Some(items) = content.get("active_categories").and_then(Value::as_array) {
        record.active_categories = items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(Category::from_label)
            .collect();
        record.active_categories.dedup();
    }
    if let Some(s) = content.get("focus").and_then(Value::as_str) {
        record.focus = s.to_string();
    }
    if let Some(v) = content.get("rerank_weights") {
        if v.is_object() {
            record.rerank_weights = v.clone();
        }
    }
    if let Some(v) = content.get("search_instruction") {
        if v.is_object() {
            record.search_instruction = v.clone();
        }
    }
    if let Some(s) = content.get("temporal_constraints").and_then(Value::as_str) {
        record.temporal_constraints = s.to_string();
    }

    record
}

fn truncate(s: &str, limit: usize) -> &str {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wrapped(content: Value) -> Value {
        json!({"results": {"messages": [{"content": content}]}})
    }

    #[test]
    fn test_parse_full_record() {
        let input = wrapped(json!({
            "message": "what changed last week?",
            "active_categories": ["corporativo_global", "casual"],
            "focus": "recent changes",
            "rerank_weights": {"lexical": 0.7, "semantic": 0.3},
            "search_instruction": {"search_clause": {"text": "changes"}},
            "temporal_constraints": "semana passada"
        }));

        let parsed = parse_classifier_output(&input);
        assert_eq!(parsed.record.message, "what changed last week?");
        assert_eq!(
            parsed.record.active_categories,
            vec![Category::CorporateGlobal, Category::Casual]
        );
        assert_eq!(parsed.record.temporal_constraints, "semana passada");
        assert_eq!(parsed.status, "classifier output parsed");
    }

    #[test]
    fn test_parse_string_input() {
        let content = json!({"message": "hi", "active_categories": ["casual"]});
        let input = Value::String(wrapped(content).to_string());

        let parsed = parse_classifier_output(&input);
        assert_eq!(parsed.record.message, "hi");
        assert_eq!(parsed.record.active_categories, vec![Category::Casual]);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let input = wrapped(json!({"message": "hi", "active_categories": ["internet"]}));
        let first = parse_classifier_output(&input);
        let second = parse_classifier_output(&input);
        assert_eq!(first.record, second.record);
        assert_eq!(first.status, second.status);
    }

    #[test]
    fn test_missing_path_degrades() {
        let parsed = parse_classifier_output(&json!({"unexpected": true}));
        assert_eq!(parsed.record, ClassifierRecord::default());
        assert!(parsed.status.contains("missing"));
    }

    #[test]
    fn test_non_json_string_degrades() {
        let parsed = parse_classifier_output(&json!("definitely not json"));
        assert_eq!(parsed.record, ClassifierRecord::default());
        assert!(parsed.status.contains("not valid JSON"));
    }

    #[test]
    fn test_non_object_content_degrades() {
        let parsed = parse_classifier_output(&wrapped(json!("just a string")));
        assert_eq!(parsed.record, ClassifierRecord::default());
    }

    #[test]
    fn test_unknown_categories_ignored() {
        let input = wrapped(json!({
            "active_categories": ["casual", "news", "corporativo_local"]
        }));
        let parsed = parse_classifier_output(&input);
        assert_eq!(
            parsed.record.active_categories,
            vec![Category::Casual, Category::CorporateLocal]
        );
    }

    #[test]
    fn test_validate_record_accepts_complete() {
        let content = json!({
            "message": "q",
            "active_categories": [],
            "focus": "",
            "rerank_weights": {"lexical": 0.5, "semantic": 0.5},
            "search_instruction": {},
            "temporal_constraints": ""
        });
        assert!(validate_record(&content).is_ok());
    }

    #[test]
    fn test_validate_record_missing_field() {
        let content = json!({"message": "q"});
        let err = validate_record(&content).unwrap_err();
        assert!(err.to_string().contains("active_categories"));
    }

    #[test]
    fn test_validate_record_incomplete_weights() {
        let content = json!({
            "message": "q",
            "active_categories": [],
            "focus": "",
            "rerank_weights": {"lexical": 0.5},
            "search_instruction": {},
            "temporal_constraints": ""
        });
        assert!(validate_record(&content).is_err());
    }
}
