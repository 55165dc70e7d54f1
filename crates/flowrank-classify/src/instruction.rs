//! Search-instruction extraction.
//!
//! The classifier embeds an opaque query spec the external search layer
//! executes. This stage only validates the envelope: it must be an
//! object and carry a `search_clause`. A missing clause is a reported
//! failure, not a degrade — running an unconstrained search would be
//! worse than failing the path.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use flowrank_core::{Error, Result};

/// Query specification consumed by the external search layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchInstruction {
    pub search_clause: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_stages: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_stage: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection_stage: Option<Value>,
}

/// Pull `search_instruction` out of a classifier payload and validate it.
pub fn extract_search_instruction(payload: &Value) -> Result<SearchInstruction> {
    let obj = payload
        .as_object()
        .ok_or_else(|| Error::Instruction("payload is not an object".into()))?;

    let instruction = obj
        .get("search_instruction")
        .ok_or_else(|| Error::Instruction("'search_instruction' key not found".into()))?;

    parse_instruction(instruction)
}

/// Validate a bare instruction value (already unwrapped).
pub fn parse_instruction(value: &Value) -> Result<SearchInstruction> {
    if !value.is_object() {
        return Err(Error::Instruction(
            "'search_instruction' is not an object".into(),
        ));
    }
    if value.get("search_clause").is_none() {
        return Err(Error::Instruction(
            "'search_clause' is missing from search instruction".into(),
        ));
    }

    let instruction: SearchInstruction = serde_json::from_value(value.clone())?;
    debug!(
        "Search instruction extracted (limit={:?}, min_score={:?})",
        instruction.limit, instruction.min_score
    );
    Ok(instruction)
}
