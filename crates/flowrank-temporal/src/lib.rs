//! Temporal filtering of grouped result chunks.
//!
//! Two variants of the same contract: a deterministic rule-based filter
//! that recognizes fixed constraint phrases, and an LLM-based filter
//! that delegates ambiguous temporal reasoning to a language model.
//! Both take a chunk list, a free-text constraint, and a strictly
//! validated current date, and return the narrowed list plus a
//! human-readable summary of the decision.

pub mod llm;
pub mod rules;
pub mod types;

pub use llm::LlmTemporalFilter;
pub use rules::RuleBasedFilter;
pub use types::{constraint_text, FilterOutput, TemporalWindow, NO_CONSTRAINT_SENTINEL};
