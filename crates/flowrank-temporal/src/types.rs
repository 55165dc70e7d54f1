//! Temporal filter types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use flowrank_core::Chunk;

/// Fixed phrase meaning "no constraint": short-circuits to pass-through
/// without a model call.
pub const NO_CONSTRAINT_SENTINEL: &str = "no temporal constraint identified";

/// Inclusive date window a group must fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TemporalWindow {
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }
}

impl std::fmt::Display for TemporalWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start.date(), self.end.date())
    }
}

/// Result of one temporal filtering pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterOutput {
    pub results: Vec<Chunk>,
    pub message: String,
    pub applied_constraints: String,
    pub date_range: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FilterOutput {
    pub fn new(
        results: Vec<Chunk>,
        message: impl Into<String>,
        applied_constraints: impl Into<String>,
        date_range: impl Into<String>,
    ) -> Self {
        Self {
            results,
            message: message.into(),
            applied_constraints: applied_constraints.into(),
            date_range: date_range.into(),
            warnings: Vec::new(),
            error: None,
        }
    }

    /// Error output: empty results, explanation attached, never a panic.
    pub fn error(constraints: impl Into<String>, error: impl std::fmt::Display) -> Self {
        let error = error.to_string();
        Self {
            results: Vec::new(),
            message: format!("temporal filtering failed: {error}"),
            applied_constraints: constraints.into(),
            date_range: String::new(),
            warnings: Vec::new(),
            error: Some(error),
        }
    }
}

/// Constraint text from either accepted input shape: a plain string or
/// `{"temporal_constraints": "..."}`.
pub fn constraint_text(input: &Value) -> String {
    match input {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("temporal_constraints")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn test_window_is_inclusive() {
        let window = TemporalWindow {
            start: dt(2024, 6, 3),
            end: dt(2024, 6, 10),
        };
        assert!(window.contains(dt(2024, 6, 3)));
        assert!(window.contains(dt(2024, 6, 10)));
        assert!(!window.contains(dt(2024, 6, 11)));
    }

    #[test]
    fn test_constraint_text_shapes() {
        assert_eq!(constraint_text(&json!("semana passada")), "semana passada");
        assert_eq!(
            constraint_text(&json!({"temporal_constraints": "última ata"})),
            "última ata"
        );
        assert_eq!(constraint_text(&json!({"other": 1})), "");
        assert_eq!(constraint_text(&json!(42)), "");
    }
}
