//! Pipeline orchestrator.
//!
//! Wires the stages end to end for one invocation: classifier parse →
//! category routing → per-active-category search (external backend) →
//! temporal filtering → reranking. The search layer and the language
//! model are collaborators the host provides; everything here is
//! synchronous and single-invocation.

pub mod pipeline;
pub mod types;

pub use pipeline::{Pipeline, SearchBackend};
pub use types::{CategoryOutcome, PipelineConfig, PipelineReport, TemporalMode};
