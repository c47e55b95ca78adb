//! Generation stage: prompt construction and resilient calls to a hosted
//! generative model (Gemini).

mod error;
mod generator;
mod prompt;
pub mod providers;
pub mod retry;

pub use error::ModelError;
pub use generator::{ResilientGenerator, QUOTA_EXHAUSTED_MESSAGE};
pub use prompt::{Prompt, PromptBuilder};
pub use providers::{GenerativeModel, GoogleProvider, ModelResponse};
pub use retry::{RecordingSleeper, RetryConfig, RetryState, Sleeper, TokioSleeper};

/// Re-exported so callers do not need a direct tokio-util dependency
pub use tokio_util::sync::CancellationToken;
