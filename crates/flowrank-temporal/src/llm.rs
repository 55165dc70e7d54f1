//! LLM-based temporal resolution.
//!
//! For constraints the rule set cannot express, interpretation is
//! delegated to a language model: one batched call carrying the current
//! date, the constraint, and per-chunk metadata. The model must answer
//! with only a JSON array of the metadata objects it selects; selected
//! objects are matched back to the full original chunks by id.

use chrono::NaiveDate;
use serde_json::{json, Value};
use tracing::{debug, warn};

use flowrank_core::json::extract_json_array;
use flowrank_core::{Chunk, Error, Result};
use flowrank_llm::LanguageModel;

use crate::types::{FilterOutput, NO_CONSTRAINT_SENTINEL};

/// Temporal filter that delegates interpretation to a language model.
pub struct LlmTemporalFilter<'a> {
    model: &'a dyn LanguageModel,
    current_date: NaiveDate,
}

impl<'a> LlmTemporalFilter<'a> {
    /// Current date must be `YYYY-MM-DD`; anything else is a hard error.
    pub fn new(model: &'a dyn LanguageModel, current_date: &str) -> Result<Self> {
        let current_date = NaiveDate::parse_from_str(current_date, "%Y-%m-%d")
            .map_err(|_| Error::InvalidDate(current_date.to_string()))?;
        Ok(Self {
            model,
            current_date,
        })
    }

    /// Host-facing entry point: decode the chunk envelope and the
    /// constraint input (plain string or wrapped object), then filter.
    pub fn filter_envelope(&self, input: &Value, constraints: &Value) -> FilterOutput {
        let (chunks, warnings) = flowrank_core::decode_chunks(input);
        let constraints = crate::types::constraint_text(constraints);
        let mut output = self.filter(&chunks, &constraints);
        output.warnings.extend(warnings);
        output
    }

    /// Apply the constraint. Exactly one model call per invocation; an
    /// empty or sentinel constraint short-circuits to pass-through with
    /// no call at all. Model failures produce a valid error output.
    pub fn filter(&self, chunks: &[Chunk], constraints: &str) -> FilterOutput {
        let trimmed = constraints.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NO_CONSTRAINT_SENTINEL) {
            debug!("No temporal constraint; passing {} chunks through", chunks.len());
            return FilterOutput::new(
                chunks.to_vec(),
                format!("no temporal constraint; {} chunks passed through", chunks.len()),
                constraints,
                "no explicit range",
            );
        }

        let mut warnings = Vec::new();
        let metadata = chunk_metadata(chunks, &mut warnings);
        if metadata.is_empty() {
            warnings.push("no chunks carry an id; nothing to evaluate".into());
            let mut output =
                FilterOutput::new(Vec::new(), "no chunks with identifiers to evaluate", constraints, "");
            output.warnings = warnings;
            return output;
        }

        let prompt = build_prompt(self.current_date, trimmed, &metadata);
        debug!(
            "Sending {} chunk descriptors to the model ({} prompt bytes)",
            metadata.len(),
            prompt.len()
        );

        let response = match self.model.generate(&prompt) {
            Ok(response) => response,
            Err(e) => return FilterOutput::error(constraints, e),
        };

        let selected = match extract_json_array(&response) {
            Ok(selected) => selected,
            Err(e) => return FilterOutput::error(constraints, e),
        };

        let results = match_selection(chunks, &selected, &mut warnings);
        let message = format!(
            "model selected {} of {} chunks for the temporal constraint",
            results.len(),
            chunks.len()
        );
        let mut output = FilterOutput::new(results, message, constraints, "model-resolved");
        output.warnings = warnings;
        output
    }
}

/// Per-chunk metadata for the prompt, restricted to chunks with an id.
fn chunk_metadata(chunks: &[Chunk], warnings: &mut Vec<String>) -> Vec<Value> {
    let mut metadata = Vec::new();
    for (idx, chunk) in chunks.iter().enumerate() {
        let Some(id) = chunk.id.as_deref() else {
            warnings.push(format!("chunk {idx} has no id; excluded from model selection"));
            continue;
        };
        metadata.push(json!({
            "id": id,
            "updated_at": chunk.updated_at,
            "event_id": chunk.event_id,
            "classification": chunk.extra_str("classification"),
            "summary": chunk.extra_str("summary"),
        }));
    }
    metadata
}

fn build_prompt(current_date: NaiveDate, constraints: &str, metadata: &[Value]) -> String {
    format!(
        "Current date: {current_date}\n\
         Temporal constraint: {constraints}\n\n\
         Below is a JSON array describing document chunks. Select the ones that \
         satisfy the temporal constraint relative to the current date.\n\
         Respond with ONLY a JSON array containing the selected objects, unchanged. \
         No explanation, no extra text.\n\n{}",
        Value::Array(metadata.to_vec())
    )
}

/// Match selected metadata objects back to their full original chunks.
fn match_selection(chunks: &[Chunk], selected: &[Value], warnings: &mut Vec<String>) -> Vec<Chunk> {
    let mut results = Vec::new();
    let mut seen: Vec<&str> = Vec::new();

    for item in selected {
        let Some(id) = item.get("id").and_then(Value::as_str) else {
            warnings.push("model returned an object without an id".into());
            continue;
        };
        if seen.contains(&id) {
            continue;
        }
        match chunks
            .iter()
            .find(|c| c.id.as_deref() == Some(id))
        {
            Some(chunk) => {
                seen.push(id);
                results.push(chunk.clone());
            }
            None => {
                warn!("Model selected unknown chunk id '{id}'");
                warnings.push(format!("model selected unknown chunk id '{id}'"));
            }
        }
    }

    results
}
