//! Analysis Application Service
//!
//! Координирует два независимых шага:
//! - `find_similar`: идея -> ближайшие патенты (RetrievalEngine)
//! - `analyze`: идея + кандидаты -> анализ (PromptBuilder -> ResilientGenerator)
//!
//! Между шагами кандидаты проходят через клиента, поэтому `analyze`
//! принимает их обратно как есть и не обращается к индексу. Сервис без
//! корпуса (`generation_only`) умеет только `analyze`.

use crate::{ApplicationError, ApplicationResult};
use common::OperationTimer;
use domain::{GenerationOutcome, PatentRecord, RetrievalResult};
use llm::{CancellationToken, PromptBuilder, ResilientGenerator};
use memory::RetrievalEngine;
use tracing::{info, instrument, warn};

pub struct AnalysisService {
    retrieval: Option<RetrievalEngine>,
    prompt_builder: PromptBuilder,
    generator: ResilientGenerator,
}

impl AnalysisService {
    pub fn new(retrieval: RetrievalEngine, generator: ResilientGenerator) -> Self {
        Self {
            retrieval: Some(retrieval),
            prompt_builder: PromptBuilder::new(),
            generator,
        }
    }

    /// Service without a corpus: `analyze` works, `find_similar` reports
    /// an infrastructure error
    pub fn generation_only(generator: ResilientGenerator) -> Self {
        Self {
            retrieval: None,
            prompt_builder: PromptBuilder::new(),
            generator,
        }
    }

    pub fn has_retrieval(&self) -> bool {
        self.retrieval.is_some()
    }

    pub fn with_prompt_builder(mut self, prompt_builder: PromptBuilder) -> Self {
        self.prompt_builder = prompt_builder;
        self
    }

    /// Up to `k` corpus records most similar to `idea`
    #[instrument(skip(self, idea), fields(idea_len = idea.len()))]
    pub async fn find_similar(&self, idea: &str, k: usize) -> ApplicationResult<RetrievalResult> {
        if idea.trim().is_empty() {
            return Err(ApplicationError::validation("No idea provided"));
        }
        let retrieval = self
            .retrieval
            .as_ref()
            .ok_or_else(|| ApplicationError::infrastructure("Patent corpus is not loaded"))?;

        let mut timer = OperationTimer::new("find_similar");
        timer.add_field("k", k);

        let result = retrieval.retrieve(idea, k).await;
        if let Ok(found) = &result {
            timer.add_field("items_count", found.len());
            if found.is_partial() {
                warn!("Returning partial retrieval result ({} records)", found.len());
            }
        }
        timer.finish_with_result(result.as_ref().map(|_| ()));

        Ok(result?)
    }

    /// Structured analysis of `idea` against `candidates`.
    ///
    /// Generation failures come back as [`GenerationOutcome::Failure`];
    /// only invalid input is an error.
    pub async fn analyze(
        &self,
        idea: &str,
        candidates: &[PatentRecord],
    ) -> ApplicationResult<GenerationOutcome> {
        self.analyze_with_cancellation(idea, candidates, &CancellationToken::new())
            .await
    }

    #[instrument(skip_all, fields(idea_len = idea.len(), candidates = candidates.len()))]
    pub async fn analyze_with_cancellation(
        &self,
        idea: &str,
        candidates: &[PatentRecord],
        token: &CancellationToken,
    ) -> ApplicationResult<GenerationOutcome> {
        if idea.trim().is_empty() || candidates.is_empty() {
            return Err(ApplicationError::validation(
                "Missing idea or similar_patents",
            ));
        }

        let start_time = std::time::Instant::now();
        let prompt = self.prompt_builder.build(idea, candidates);
        let outcome = self.generator.generate_with_cancellation(&prompt, token).await;

        info!(
            success = outcome.is_success(),
            duration_ms = start_time.elapsed().as_millis() as u64,
            "Analysis finished"
        );
        Ok(outcome)
    }
}
