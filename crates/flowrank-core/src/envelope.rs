//! Chunk-bearing envelope decoding.
//!
//! Every stage exchanges chunk lists wrapped as `{"results": [...]}`.
//! Upstream hosts are sloppy about the wrapper, so the boundary decoder
//! accepts an enveloped object, a bare array, or a JSON-encoded string of
//! either. The decision is made once here; internal logic only ever sees
//! `Vec<Chunk>`.

use serde_json::Value;
use tracing::debug;

use crate::chunk::Chunk;

/// Decode a chunk list from any accepted envelope shape.
///
/// Items that are not JSON objects are skipped with a warning; the
/// warnings are returned for diagnostic output rather than failing the
/// whole decode.
pub fn decode_chunks(value: &Value) -> (Vec<Chunk>, Vec<String>) {
    let mut warnings = Vec::new();
    let chunks = decode_inner(value, &mut warnings, true);
    debug!(
        "Decoded {} chunks ({} warnings)",
        chunks.len(),
        warnings.len()
    );
    (chunks, warnings)
}

fn decode_inner(value: &Value, warnings: &mut Vec<String>, allow_string: bool) -> Vec<Chunk> {
    match value {
        Value::Array(items) => collect_items(items, warnings),
        Value::Object(map) => {
            for key in ["results", "reranked"] {
                if let Some(Value::Array(items)) = map.get(key) {
                    return collect_items(items, warnings);
                }
            }
            warnings.push("envelope object has no 'results' or 'reranked' array".into());
            Vec::new()
        }
        Value::String(s) if allow_string => match serde_json::from_str::<Value>(s) {
            Ok(parsed) => decode_inner(&parsed, warnings, false),
            Err(e) => {
                warnings.push(format!("envelope string is not valid JSON: {e}"));
                Vec::new()
            }
        },
        other => {
            warnings.push(format!(
                "unsupported envelope shape: {}",
                type_name(other)
            ));
            Vec::new()
        }
    }
}

fn collect_items(items: &[Value], warnings: &mut Vec<String>) -> Vec<Chunk> {
    let mut chunks = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        match serde_json::from_value::<Chunk>(item.clone()) {
            Ok(chunk) => chunks.push(chunk),
            Err(_) => warnings.push(format!(
                "item {idx} is not an object ({}), skipped",
                type_name(item)
            )),
        }
    }
    chunks
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
