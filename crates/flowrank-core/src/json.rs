//! JSON recovery from raw model text.
//!
//! Language models are asked to answer with JSON only, but responses
//! routinely arrive wrapped in fenced code blocks or surrounded by
//! narration. Recovery order: whole-text parse, fenced block, balanced
//! delimiter scan.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{Error, Result};

static FENCED_OBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("valid fence regex")
});

static FENCED_ARRAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\[.*?\])\s*```").expect("valid fence regex")
});

/// Extract the first valid JSON object from raw text.
pub fn extract_json_object(text: &str) -> Result<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(text.trim()) {
        if value.is_object() {
            return Ok(value);
        }
    }

    for cap in FENCED_OBJECT.captures_iter(text) {
        if let Ok(value) = serde_json::from_str::<Value>(cap[1].trim()) {
            if value.is_object() {
                return Ok(value);
            }
        }
    }

    if let Some(value) = scan_balanced(text, '{', '}') {
        return Ok(value);
    }

    Err(Error::ModelResponse(
        "no valid JSON object found in text".into(),
    ))
}

/// Extract the first valid JSON array from raw text.
pub fn extract_json_array(text: &str) -> Result<Vec<Value>> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text.trim()) {
        return Ok(items);
    }

    for cap in FENCED_ARRAY.captures_iter(text) {
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(cap[1].trim()) {
            return Ok(items);
        }
    }

    if let Some(Value::Array(items)) = scan_balanced(text, '[', ']') {
        return Ok(items);
    }

    Err(Error::ModelResponse(
        "no valid JSON array found in text".into(),
    ))
}

/// Scan for the first balanced `open`..`close` span that parses as JSON.
fn scan_balanced(text: &str, open: char, close: char) -> Option<Value> {
    let start = text.find(open)?;
    let mut depth = 0usize;
    for (offset, ch) in text[start..].char_indices() {
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth == 0 {
                let candidate = &text[start..start + offset + ch.len_utf8()];
                if let Ok(value) = serde_json::from_str::<Value>(candidate) {
                    return Some(value);
                }
                return None;
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_object() {
        let value = extract_json_object(r#"{"message": "hi"}"#).unwrap();
        assert_eq!(value["message"], "hi");
    }

    #[test]
    fn test_extract_fenced_object() {
        let text = "Here you go:\n```json\n{\"message\": \"hi\"}\n```\nDone.";
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["message"], "hi");
    }

    #[test]
    fn test_extract_embedded_object() {
        let text = "The answer is {\"a\": {\"b\": 1}} as requested";
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["a"]["b"], 1);
    }

    #[test]
    fn test_extract_object_failure() {
        assert!(extract_json_object("no json here").is_err());
    }

    #[test]
    fn test_extract_plain_array() {
        let items = extract_json_array(r#"[{"id": "a"}]"#).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_extract_fenced_array() {
        let text = "```json\n[{\"id\": \"a\"}, {\"id\": \"b\"}]\n```";
        let items = extract_json_array(text).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_extract_array_from_narration() {
        let text = "Selected chunks: [{\"id\": \"a\"}] based on the constraint.";
        let items = extract_json_array(text).unwrap();
        assert_eq!(items[0]["id"], "a");
    }

    #[test]
    fn test_extract_array_failure() {
        assert!(extract_json_array("the model refused").is_err());
    }
}
