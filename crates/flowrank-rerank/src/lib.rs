//! Lexical + semantic + LLM reranking.
//!
//! Merges two ranked result sets, deduplicates by id, scores every
//! merged chunk with one batched model call, blends the scores with
//! configurable weights, filters, and truncates to the top results.

pub mod rerank;
pub mod types;

pub use rerank::Reranker;
pub use types::{parse_min_score, RerankOutput, RerankWeights, RerankedChunk};
