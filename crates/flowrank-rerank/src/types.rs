//! Reranker types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use flowrank_core::Chunk;

pub const DEFAULT_WEIGHT: f64 = 0.5;
pub const DEFAULT_MIN_FINAL_SCORE: f64 = 2.0;

/// Blend weights for the lexical and semantic score components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RerankWeights {
    #[serde(default = "default_weight")]
    pub lexical: f64,
    #[serde(default = "default_weight")]
    pub semantic: f64,
}

fn default_weight() -> f64 {
    DEFAULT_WEIGHT
}

impl Default for RerankWeights {
    fn default() -> Self {
        Self {
            lexical: DEFAULT_WEIGHT,
            semantic: DEFAULT_WEIGHT,
        }
    }
}

impl RerankWeights {
    /// Tolerant parse: an object, a JSON-encoded object string, or
    /// anything else (falls back to defaults). Missing keys default to
    /// 0.5 individually.
    pub fn parse(value: &Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value.clone()).unwrap_or_default(),
            Value::String(s) => serde_json::from_str(s).unwrap_or_default(),
            _ => Self::default(),
        }
    }
}

/// A chunk with its judged relevance and blended final score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankedChunk {
    #[serde(flatten)]
    pub chunk: Chunk,
    pub llm_relevance_score: f64,
    pub final_score: f64,
}

/// Result of one rerank pass: the `{"reranked": [...]}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankOutput {
    pub reranked: Vec<RerankedChunk>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RerankOutput {
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            reranked: Vec::new(),
            message: message.into(),
            warnings: Vec::new(),
            error: None,
        }
    }

    pub fn error(error: impl std::fmt::Display) -> Self {
        let error = error.to_string();
        Self {
            reranked: Vec::new(),
            message: format!("rerank failed: {error}"),
            warnings: Vec::new(),
            error: Some(error),
        }
    }
}

/// Parse the minimum final score, accepting a comma decimal separator.
/// Unparseable input falls back to the default of 2.0.
pub fn parse_min_score(value: &str) -> f64 {
    value
        .trim()
        .replace(',', ".")
        .parse()
        .unwrap_or(DEFAULT_MIN_FINAL_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_weights_from_object() {
        let weights = RerankWeights::parse(&json!({"lexical": 0.7, "semantic": 0.3}));
        assert_eq!(weights.lexical, 0.7);
        assert_eq!(weights.semantic, 0.3);
    }

    #[test]
    fn test_weights_missing_keys_default() {
        let weights = RerankWeights::parse(&json!({"lexical": 0.9}));
        assert_eq!(weights.lexical, 0.9);
        assert_eq!(weights.semantic, 0.5);
    }

    #[test]
    fn test_weights_from_string_and_garbage() {
        let weights = RerankWeights::parse(&json!("{\"lexical\": 0.2, \"semantic\": 0.8}"));
        assert_eq!(weights.lexical, 0.2);

        assert_eq!(RerankWeights::parse(&json!(42)), RerankWeights::default());
        assert_eq!(RerankWeights::parse(&json!("not json")), RerankWeights::default());
    }

    #[test]
    fn test_parse_min_score() {
        assert_eq!(parse_min_score("2.5"), 2.5);
        assert_eq!(parse_min_score("2,5"), 2.5);
        assert_eq!(parse_min_score(" 3 "), 3.0);
        assert_eq!(parse_min_score("abc"), DEFAULT_MIN_FINAL_SCORE);
    }
}
