//! Rerank pipeline: merge, score, blend, filter, truncate.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use serde_json::Value;

use flowrank_core::{decode_chunks, Chunk, ChunkSource};
use flowrank_llm::LanguageModel;

use crate::types::{RerankOutput, RerankWeights, RerankedChunk, DEFAULT_MIN_FINAL_SCORE};

/// Signed numeric runs: integers, decimals with either separator, and
/// unspaced comma lists like "8,7,9".
static NUMBER_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-+]?\d+(?:[.,]\d+)*").expect("valid number regex"));

const DEFAULT_TOP_K: usize = 5;

/// Reranker configuration. One instance can serve many invocations;
/// all per-invocation state lives in `rerank`.
pub struct Reranker {
    weights: RerankWeights,
    top_k: usize,
    min_final_score: f64,
}

impl Default for Reranker {
    fn default() -> Self {
        Self {
            weights: RerankWeights::default(),
            top_k: DEFAULT_TOP_K,
            min_final_score: DEFAULT_MIN_FINAL_SCORE,
        }
    }
}

impl Reranker {
    pub fn new(weights: RerankWeights) -> Self {
        Self {
            weights,
            ..Default::default()
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_min_final_score(mut self, min_final_score: f64) -> Self {
        self.min_final_score = min_final_score;
        self
    }

    /// Host-facing entry point: both inputs are chunk envelopes in any
    /// accepted shape. Decode warnings carry through to the output.
    pub fn rerank_envelope(
        &self,
        model: &dyn LanguageModel,
        question: &str,
        lexical: &Value,
        semantic: &Value,
    ) -> RerankOutput {
        let (lexical, mut decode_warnings) = decode_chunks(lexical);
        let (semantic, semantic_warnings) = decode_chunks(semantic);
        decode_warnings.extend(semantic_warnings);

        let mut output = self.rerank(model, question, lexical, semantic);
        output.warnings.extend(decode_warnings);
        output
    }

    /// Merge, score, and rank. Never raises past this boundary: a model
    /// failure becomes an error payload with an empty result set.
    pub fn rerank(
        &self,
        model: &dyn LanguageModel,
        question: &str,
        lexical: Vec<Chunk>,
        semantic: Vec<Chunk>,
    ) -> RerankOutput {
        let chunks = merge_chunks(lexical, semantic);
        if chunks.is_empty() {
            return RerankOutput::empty("no valid input chunks");
        }

        let prompt = build_prompt(question, &chunks);
        debug!("Scoring {} merged chunks ({} prompt bytes)", chunks.len(), prompt.len());

        let response = match model.generate(&prompt) {
            Ok(response) => response,
            Err(e) => return RerankOutput::error(e),
        };

        let scores = extract_scores(&response, chunks.len());
        let mut warnings = Vec::new();
        if scores.len() < chunks.len() {
            let dropped = chunks.len() - scores.len();
            warn!("Model returned {} scores for {} chunks; {dropped} dropped from scoring",
                scores.len(), chunks.len());
            warnings.push(format!(
                "model returned {} scores for {} chunks; {dropped} chunks dropped from scoring",
                scores.len(),
                chunks.len()
            ));
        }

        let mut reranked: Vec<RerankedChunk> = chunks
            .into_iter()
            .zip(scores)
            .map(|(chunk, llm_score)| self.blend(chunk, llm_score))
            // Zero is the "model could not score" sentinel
            .filter(|rc| rc.llm_relevance_score > 0.0)
            .filter(|rc| rc.final_score >= self.min_final_score)
            .collect();

        // Stable sort: ties preserve pre-sort relative order
        reranked.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        reranked.truncate(self.top_k);

        let message = format!(
            "rerank complete: top {} returned (final score >= {})",
            reranked.len(),
            self.min_final_score
        );
        info!("{message}");

        RerankOutput {
            reranked,
            message,
            warnings,
            error: None,
        }
    }

    fn blend(&self, chunk: Chunk, llm_score: f64) -> RerankedChunk {
        let lexical_component = match chunk.source {
            Some(ChunkSource::Lexical) => chunk.lexical_score.unwrap_or(0.0),
            _ => 0.0,
        };
        let semantic_component = match chunk.source {
            Some(ChunkSource::Semantic) => chunk.semantic_score.unwrap_or(0.0),
            _ => 0.0,
        };

        let final_score = (self.weights.lexical * lexical_component
            + self.weights.semantic * semantic_component
            + llm_score)
            / (1.0 + self.weights.lexical + self.weights.semantic);

        RerankedChunk {
            chunk,
            llm_relevance_score: llm_score,
            final_score,
        }
    }
}

/// Union of both lists, deduplicated by id. Lexical chunks are inserted
/// first; a semantic chunk with the same id overwrites in place (keeping
/// the lexical position) and the survivor is tagged semantic. Chunks
/// without an id get a synthetic key so they are retained but never
/// deduplicated against the other source.
fn merge_chunks(lexical: Vec<Chunk>, semantic: Vec<Chunk>) -> Vec<Chunk> {
    let mut merged: Vec<Chunk> = Vec::with_capacity(lexical.len() + semantic.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for (source, chunks) in [
        (ChunkSource::Lexical, lexical),
        (ChunkSource::Semantic, semantic),
    ] {
        for mut chunk in chunks {
            chunk.source = Some(source);
            let key = chunk
                .id
                .clone()
                .unwrap_or_else(|| format!("synthetic-{}", Uuid::new_v4()));
            match index.get(&key) {
                Some(&pos) => merged[pos] = chunk,
                None => {
                    index.insert(key, merged.len());
                    merged.push(chunk);
                }
            }
        }
    }

    merged
}

fn build_prompt(question: &str, chunks: &[Chunk]) -> String {
    let mut prompt = format!(
        "Question: {question}\n\
         Rate from 0 to 10 how well each text below answers the question. \
         Respond only with a list of numbers, in the same order as the texts.\n"
    );
    for (idx, chunk) in chunks.iter().enumerate() {
        prompt.push_str(&format!("\nText {}: {}", idx + 1, chunk.text()));
    }
    prompt
}

/// Extract at most `limit` numeric scores from the raw model response.
/// A short response yields fewer scores; trailing chunks are dropped
/// from scoring, not retried.
///
/// A single comma between digits reads as a decimal separator ("7,5");
/// a run with more commas than that is an unspaced list ("8,7,9").
fn extract_scores(response: &str, limit: usize) -> Vec<f64> {
    let mut scores = Vec::new();
    for m in NUMBER_RUN.find_iter(response) {
        let token = m.as_str();
        let commas = token.matches(',').count();
        if commas == 1 && !token.contains('.') {
            scores.extend(token.replace(',', ".").parse::<f64>().ok());
        } else if commas > 0 {
            scores.extend(token.split(',').filter_map(|part| part.parse::<f64>().ok()));
        } else {
            scores.extend(token.parse::<f64>().ok());
        }
        if scores.len() >= limit {
            break;
        }
    }
    scores.truncate(limit);
    scores
}
