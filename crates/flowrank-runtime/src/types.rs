//! Runtime types.

use serde::Serialize;

use flowrank_classify::Category;
use flowrank_rerank::RerankedChunk;

/// Which temporal filter variant the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalMode {
    /// Deterministic fixed-pattern resolution.
    Rules,
    /// Delegate interpretation to the language model.
    Model,
}

/// Per-invocation pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Current date, strictly `YYYY-MM-DD`.
    pub current_date: String,
    pub temporal_mode: TemporalMode,
    pub top_k: usize,
    pub min_final_score: f64,
}

impl PipelineConfig {
    pub fn new(current_date: impl Into<String>) -> Self {
        Self {
            current_date: current_date.into(),
            temporal_mode: TemporalMode::Rules,
            top_k: 5,
            min_final_score: 2.0,
        }
    }

    pub fn with_temporal_mode(mut self, mode: TemporalMode) -> Self {
        self.temporal_mode = mode;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_min_final_score(mut self, min_final_score: f64) -> Self {
        self.min_final_score = min_final_score;
        self
    }
}

/// What happened on one category path.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryOutcome {
    pub category: Category,
    /// Path was not in the active set; nothing ran.
    pub stopped: bool,
    pub chunks_retrieved: usize,
    pub chunks_after_temporal: usize,
    pub reranked: Vec<RerankedChunk>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CategoryOutcome {
    pub fn stopped(category: Category) -> Self {
        Self {
            category,
            stopped: true,
            chunks_retrieved: 0,
            chunks_after_temporal: 0,
            reranked: Vec::new(),
            warnings: Vec::new(),
            error: None,
        }
    }

    /// Active path that involves no retrieval work.
    pub fn passthrough(category: Category) -> Self {
        Self {
            stopped: false,
            ..Self::stopped(category)
        }
    }

    pub fn error(category: Category, error: impl std::fmt::Display) -> Self {
        Self {
            category,
            stopped: false,
            chunks_retrieved: 0,
            chunks_after_temporal: 0,
            reranked: Vec::new(),
            warnings: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

/// Result of one full pipeline invocation.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub status: String,
    pub outcomes: Vec<CategoryOutcome>,
}

impl PipelineReport {
    /// Outcome for a given category, if that path produced one.
    pub fn outcome(&self, category: Category) -> Option<&CategoryOutcome> {
        self.outcomes.iter().find(|o| o.category == category)
    }
}
