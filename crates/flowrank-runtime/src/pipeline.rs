//! Pipeline execution.

use serde_json::Value;
use tracing::{debug, info};

use flowrank_classify::instruction::parse_instruction;
use flowrank_classify::{Category, ClassifierRecord, SearchInstruction};
use flowrank_core::{Chunk, Result};
use flowrank_llm::LanguageModel;
use flowrank_rerank::{Reranker, RerankWeights};
use flowrank_route::RoutingDecision;
use flowrank_temporal::{FilterOutput, LlmTemporalFilter, RuleBasedFilter};

use crate::types::{CategoryOutcome, PipelineConfig, PipelineReport, TemporalMode};

/// External search layer executing the classifier's search instruction.
/// The host adapts its database client to this interface; failures are
/// converted into error outcomes, never propagated as panics.
pub trait SearchBackend {
    fn lexical_search(
        &self,
        instruction: &SearchInstruction,
        sectors: &[String],
    ) -> Result<Vec<Chunk>>;

    fn semantic_search(
        &self,
        instruction: &SearchInstruction,
        sectors: &[String],
    ) -> Result<Vec<Chunk>>;
}

/// One pipeline instance per configuration. `run` holds no mutable
/// state, so instances can serve many independent invocations.
pub struct Pipeline<'a> {
    config: PipelineConfig,
    rules: RuleBasedFilter,
    model: &'a dyn LanguageModel,
    backend: &'a dyn SearchBackend,
}

impl<'a> Pipeline<'a> {
    /// Build a pipeline. The configured current date is validated here;
    /// a malformed date is a hard error before anything runs.
    pub fn new(
        config: PipelineConfig,
        model: &'a dyn LanguageModel,
        backend: &'a dyn SearchBackend,
    ) -> Result<Self> {
        let rules = RuleBasedFilter::new(&config.current_date)?;
        Ok(Self {
            config,
            rules,
            model,
            backend,
        })
    }

    /// Execute one full invocation: route, then per active category
    /// search → temporal filter → rerank.
    pub fn run(&self, classifier_input: &Value, sectors_input: &Value) -> PipelineReport {
        let decision = RoutingDecision::new(classifier_input, sectors_input);
        let record = decision.record().clone();
        let sectors: Vec<String> =
            serde_json::from_str(decision.sectors_json()).unwrap_or_default();

        let mut outcomes = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            if !decision.is_active(category) {
                outcomes.push(CategoryOutcome::stopped(category));
                continue;
            }
            match category {
                Category::CorporateGlobal | Category::CorporateLocal => {
                    outcomes.push(self.run_search_path(category, &record, &sectors));
                }
                // Casual and internet paths carry the message onward but
                // involve no retrieval; nothing to do here.
                Category::Casual | Category::Internet => {
                    outcomes.push(CategoryOutcome::passthrough(category));
                }
            }
        }

        info!("Pipeline finished: {}", decision.status());
        PipelineReport {
            status: decision.status().to_string(),
            outcomes,
        }
    }

    fn run_search_path(
        &self,
        category: Category,
        record: &ClassifierRecord,
        sectors: &[String],
    ) -> CategoryOutcome {
        let instruction = match parse_instruction(&record.search_instruction) {
            Ok(instruction) => instruction,
            Err(e) => return CategoryOutcome::error(category, e),
        };

        let lexical = match self.backend.lexical_search(&instruction, sectors) {
            Ok(chunks) => chunks,
            Err(e) => return CategoryOutcome::error(category, e),
        };
        let semantic = match self.backend.semantic_search(&instruction, sectors) {
            Ok(chunks) => chunks,
            Err(e) => return CategoryOutcome::error(category, e),
        };
        let chunks_retrieved = lexical.len() + semantic.len();
        debug!(
            "{}: retrieved {} lexical + {} semantic chunks",
            category.as_str(),
            lexical.len(),
            semantic.len()
        );

        let mut warnings = Vec::new();
        let constraints = &record.temporal_constraints;
        let (lexical, semantic) = {
            let lex_out = self.apply_temporal(lexical, constraints);
            let sem_out = self.apply_temporal(semantic, constraints);
            warnings.extend(lex_out.warnings.iter().cloned());
            warnings.extend(sem_out.warnings.iter().cloned());
            if let Some(error) = lex_out.error.or(sem_out.error) {
                let mut outcome = CategoryOutcome::error(category, error);
                outcome.chunks_retrieved = chunks_retrieved;
                outcome.warnings = warnings;
                return outcome;
            }
            (lex_out.results, sem_out.results)
        };
        let chunks_after_temporal = lexical.len() + semantic.len();

        let weights = RerankWeights::parse(&record.rerank_weights);
        let reranker = Reranker::new(weights)
            .with_top_k(self.config.top_k)
            .with_min_final_score(self.config.min_final_score);
        let reranked = reranker.rerank(self.model, &record.message, lexical, semantic);
        warnings.extend(reranked.warnings);

        CategoryOutcome {
            category,
            stopped: false,
            chunks_retrieved,
            chunks_after_temporal,
            reranked: reranked.reranked,
            warnings,
            error: reranked.error,
        }
    }

    fn apply_temporal(&self, chunks: Vec<Chunk>, constraints: &str) -> FilterOutput {
        match self.config.temporal_mode {
            TemporalMode::Rules => self.rules.filter(chunks, constraints),
            TemporalMode::Model => {
                match LlmTemporalFilter::new(self.model, &self.config.current_date) {
                    Ok(filter) => filter.filter(&chunks, constraints),
                    // Date already validated at construction
                    Err(e) => FilterOutput::error(constraints, e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowrank_core::Error;
    use flowrank_llm::CannedModel;
    use serde_json::json;

    struct FixedBackend {
        lexical: Vec<Chunk>,
        semantic: Vec<Chunk>,
        fail: bool,
    }

    impl SearchBackend for FixedBackend {
        fn lexical_search(
            &self,
            _instruction: &SearchInstruction,
            _sectors: &[String],
        ) -> Result<Vec<Chunk>> {
            if self.fail {
                return Err(Error::Http("search backend down".into()));
            }
            Ok(self.lexical.clone())
        }

        fn semantic_search(
            &self,
            _instruction: &SearchInstruction,
            _sectors: &[String],
        ) -> Result<Vec<Chunk>> {
            if self.fail {
                return Err(Error::Http("search backend down".into()));
            }
            Ok(self.semantic.clone())
        }
    }

    fn chunk(id: &str, updated: &str, text: &str, lexical: bool) -> Chunk {
        let mut value = json!({
            "id": id,
            "event_id": id,
            "updated_at": updated,
            "text": text,
        });
        let score_key = if lexical { "lexical_score" } else { "semantic_score" };
        value[score_key] = json!(1.0);
        serde_json::from_value(value).unwrap()
    }

    fn classifier_input(categories: &[&str], constraints: &str) -> Value {
        json!({
            "results": {"messages": [{"content": {
                "message": "what happened last week?",
                "active_categories": categories,
                "focus": "events",
                "rerank_weights": {"lexical": 0.5, "semantic": 0.5},
                "search_instruction": {"search_clause": {"text": "events"}},
                "temporal_constraints": constraints
            }}]}
        })
    }

    #[test]
    fn test_invalid_date_rejected_at_construction() {
        let model = CannedModel::fixed("9");
        let backend = FixedBackend {
            lexical: Vec::new(),
            semantic: Vec::new(),
            fail: false,
        };
        let result = Pipeline::new(PipelineConfig::new("last monday"), &model, &backend);
        assert!(matches!(result, Err(Error::InvalidDate(_))));
    }

    #[test]
    fn test_full_run_rules_mode() {
        let model = CannedModel::fixed("9, 8");
        let backend = FixedBackend {
            // 2024-06-10 is a Monday; only the 06-04 chunk is last week
            lexical: vec![
                chunk("a", "2024-06-04T10:00:00", "in window", true),
                chunk("b", "2024-05-20", "too old", true),
            ],
            semantic: vec![chunk("c", "2024-06-05", "also in window", false)],
            fail: false,
        };
        let pipeline =
            Pipeline::new(PipelineConfig::new("2024-06-10"), &model, &backend).unwrap();
        let report = pipeline.run(
            &classifier_input(&["corporativo_global"], "semana passada"),
            &json!(["Apoio"]),
        );

        let outcome = report.outcome(Category::CorporateGlobal).unwrap();
        assert!(!outcome.stopped);
        assert!(outcome.error.is_none());
        assert_eq!(outcome.chunks_retrieved, 3);
        assert_eq!(outcome.chunks_after_temporal, 2);
        assert_eq!(outcome.reranked.len(), 2);
        // Highest LLM score first
        assert_eq!(outcome.reranked[0].chunk.id.as_deref(), Some("a"));

        // Inactive paths are stopped
        assert!(report.outcome(Category::Casual).unwrap().stopped);
        assert!(report.outcome(Category::Internet).unwrap().stopped);
    }

    #[test]
    fn test_model_temporal_mode() {
        // First response answers the temporal selection for the lexical
        // list, second for the semantic list, third scores the rerank.
        let model = CannedModel::new([
            r#"[{"id": "a"}]"#.to_string(),
            "[]".to_string(),
            "7".to_string(),
        ]);
        let backend = FixedBackend {
            lexical: vec![
                chunk("a", "2024-06-04", "kept", true),
                chunk("b", "2024-05-20", "dropped", true),
            ],
            semantic: vec![chunk("c", "2024-06-05", "dropped too", false)],
            fail: false,
        };
        let config = PipelineConfig::new("2024-06-10")
            .with_temporal_mode(TemporalMode::Model)
            .with_min_final_score(0.0);
        let pipeline = Pipeline::new(config, &model, &backend).unwrap();
        let report = pipeline.run(
            &classifier_input(&["corporativo_local"], "before the holidays"),
            &json!([]),
        );

        let outcome = report.outcome(Category::CorporateLocal).unwrap();
        assert!(outcome.error.is_none());
        assert_eq!(outcome.chunks_after_temporal, 1);
        assert_eq!(outcome.reranked.len(), 1);
        assert_eq!(outcome.reranked[0].chunk.id.as_deref(), Some("a"));
    }

    #[test]
    fn test_backend_failure_becomes_error_outcome() {
        let model = CannedModel::fixed("9");
        let backend = FixedBackend {
            lexical: Vec::new(),
            semantic: Vec::new(),
            fail: true,
        };
        let pipeline =
            Pipeline::new(PipelineConfig::new("2024-06-10"), &model, &backend).unwrap();
        let report = pipeline.run(
            &classifier_input(&["corporativo_global"], ""),
            &json!([]),
        );

        let outcome = report.outcome(Category::CorporateGlobal).unwrap();
        assert!(outcome.error.as_deref().unwrap().contains("backend down"));
        assert!(outcome.reranked.is_empty());
    }

    #[test]
    fn test_missing_search_clause_is_error_outcome() {
        let model = CannedModel::fixed("9");
        let backend = FixedBackend {
            lexical: Vec::new(),
            semantic: Vec::new(),
            fail: false,
        };
        let input = json!({
            "results": {"messages": [{"content": {
                "message": "q",
                "active_categories": ["corporativo_global"],
                "search_instruction": {"limit": 5}
            }}]}
        });
        let pipeline =
            Pipeline::new(PipelineConfig::new("2024-06-10"), &model, &backend).unwrap();
        let report = pipeline.run(&input, &json!([]));

        let outcome = report.outcome(Category::CorporateGlobal).unwrap();
        assert!(outcome.error.as_deref().unwrap().contains("search_clause"));
    }

    #[test]
    fn test_casual_path_runs_without_retrieval() {
        let model = CannedModel::fixed("9");
        let backend = FixedBackend {
            lexical: Vec::new(),
            semantic: Vec::new(),
            fail: false,
        };
        let pipeline =
            Pipeline::new(PipelineConfig::new("2024-06-10"), &model, &backend).unwrap();
        let report = pipeline.run(&classifier_input(&["casual"], ""), &json!([]));

        let outcome = report.outcome(Category::Casual).unwrap();
        assert!(!outcome.stopped);
        assert_eq!(outcome.chunks_retrieved, 0);
        assert!(outcome.error.is_none());
    }
}
