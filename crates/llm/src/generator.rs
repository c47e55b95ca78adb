//! ResilientGenerator: one prompt in, one [`GenerationOutcome`] out

use crate::error::ModelError;
use crate::prompt::Prompt;
use crate::providers::{GenerativeModel, ModelResponse};
use crate::retry::{RetryConfig, RetryState, Sleeper, TokioSleeper};
use domain::{FailureKind, GenerationOutcome};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

pub const QUOTA_EXHAUSTED_MESSAGE: &str =
    "Failed to get a response from Gemini due to repeated quota limits.";

/// Calls the model with exponential backoff on quota errors.
///
/// Never returns an error: every terminal state is folded into a
/// [`GenerationOutcome`].
#[derive(Clone)]
pub struct ResilientGenerator {
    model: Arc<dyn GenerativeModel>,
    model_id: String,
    config: RetryConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl ResilientGenerator {
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        model_id: impl Into<String>,
        config: RetryConfig,
    ) -> Self {
        Self {
            model,
            model_id: model_id.into(),
            config,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub async fn generate(&self, prompt: &Prompt) -> GenerationOutcome {
        self.generate_with_cancellation(prompt, &CancellationToken::new())
            .await
    }

    /// Like [`generate`](Self::generate), but a cancelled `token` aborts the
    /// in-flight attempt or the pending backoff sleep
    #[instrument(skip(self, prompt, token), fields(model = %self.model_id, prompt_len = prompt.len()))]
    pub async fn generate_with_cancellation(
        &self,
        prompt: &Prompt,
        token: &CancellationToken,
    ) -> GenerationOutcome {
        let start = Instant::now();
        let max_attempts = self.config.max_attempts;
        let mut state = RetryState::initial();
        let mut attempts = 0;
        let mut response: Option<ModelResponse> = None;
        let mut last_error: Option<ModelError> = None;

        while !state.is_terminal() {
            state = match state {
                RetryState::Attempting(attempt) => {
                    attempts = attempt;
                    debug!("Attempt {}/{} to call model {}", attempt, max_attempts, self.model_id);

                    let result = tokio::select! {
                        biased;
                        _ = token.cancelled() => return cancelled(attempt),
                        result = self.model.generate_content(&self.model_id, prompt.as_str()) => result,
                    };

                    match result {
                        Ok(resp) => {
                            response = Some(resp);
                            RetryState::Succeeded
                        }
                        Err(err) => {
                            let next = RetryState::on_error(attempt, &err, &self.config);
                            last_error = Some(err);
                            next
                        }
                    }
                }
                RetryState::RetryScheduled { attempt, delay } => {
                    warn!(
                        "Quota exceeded for model {}. Retrying in {:?} (attempt {}/{})",
                        self.model_id, delay, attempt, max_attempts
                    );
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => return cancelled(attempt - 1),
                        _ = self.sleeper.sleep(delay) => {}
                    }
                    RetryState::Attempting(attempt)
                }
                terminal => terminal,
            };
        }

        let message = last_error
            .as_ref()
            .map(|e| e.message().to_string())
            .unwrap_or_default();

        match state {
            RetryState::Succeeded => {
                info!(
                    attempts,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Generation succeeded"
                );
                GenerationOutcome::success(response.map(ModelResponse::into_text).unwrap_or_default())
            }
            RetryState::RetryExhausted => {
                error!(
                    "Failed to get a response from model {} after {} attempts due to quota limits",
                    self.model_id, attempts
                );
                GenerationOutcome::failure(FailureKind::QuotaExceeded, QUOTA_EXHAUSTED_MESSAGE)
            }
            RetryState::PermanentFailure(FailureKind::ModelUnavailable) => {
                error!(
                    "Model '{}' not found or not supported: {}",
                    self.model_id, message
                );
                GenerationOutcome::failure(
                    FailureKind::ModelUnavailable,
                    format!(
                        "Model '{}' not found or supported: {}",
                        self.model_id, message
                    ),
                )
            }
            RetryState::PermanentFailure(kind) => {
                error!("Error in model call: {}", message);
                GenerationOutcome::failure(kind, message)
            }
            RetryState::Attempting(_) | RetryState::RetryScheduled { .. } => {
                GenerationOutcome::failure(FailureKind::Unknown, "retry loop ended early")
            }
        }
    }
}

fn cancelled(attempts: u32) -> GenerationOutcome {
    warn!("Generation cancelled after {} attempt(s)", attempts);
    GenerationOutcome::failure(
        FailureKind::Cancelled,
        format!("Generation cancelled after {attempts} attempt(s)"),
    )
}
