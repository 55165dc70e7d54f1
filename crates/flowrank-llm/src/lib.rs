//! Language model collaborator — capability trait and external providers.
//!
//! The pipeline only ever calls one uniform method: `generate(prompt)`.
//! Adapting concrete backends (OpenAI-compatible APIs, Anthropic) to that
//! interface happens here; the filtering/reranking crates stay provider
//! agnostic.

pub mod config;
pub mod model;
pub mod providers;
pub mod types;

pub use config::ModelConfig;
pub use model::{CannedModel, FailingModel, LanguageModel};
pub use providers::HttpModel;
pub use types::Provider;
