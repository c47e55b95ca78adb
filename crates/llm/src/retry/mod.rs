//! Retry policy for generative model calls
//!
//! One invocation walks an explicit state machine:
//!
//! ```text
//! Attempting(n) -> Succeeded
//!               -> RetryScheduled { attempt: n + 1, delay }  (quota exceeded, n < max)
//!               -> RetryExhausted                            (quota exceeded, n == max)
//!               -> PermanentFailure(kind)                    (not found / anything else)
//! RetryScheduled { attempt, delay } -> Attempting(attempt)   (after sleeping `delay`)
//! ```
//!
//! Sleeping goes through [`Sleeper`] so tests can record delays instead of
//! waiting for them.

use crate::error::ModelError;
use async_trait::async_trait;
use domain::FailureKind;
use parking_lot::Mutex;
use std::time::Duration;

/// Configuration for retry behavior with exponential backoff
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub initial_delay: Duration,
    /// Multiplier for exponential backoff calculation
    pub backoff_multiplier: f64,
    /// Optional cap on a single delay
    pub max_delay: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            max_delay: None,
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Delay to wait after failed attempt `attempt` (1-based):
    /// `initial_delay * multiplier^(attempt - 1)`, capped by `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let delay = Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX);

        match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }
}

/// State of one generation invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Attempting(u32),
    RetryScheduled { attempt: u32, delay: Duration },
    Succeeded,
    PermanentFailure(FailureKind),
    RetryExhausted,
}

impl RetryState {
    pub fn initial() -> Self {
        RetryState::Attempting(1)
    }

    /// Transition taken when attempt `attempt` failed with `error`
    pub fn on_error(attempt: u32, error: &ModelError, config: &RetryConfig) -> Self {
        match error {
            ModelError::QuotaExceeded(_) if attempt >= config.max_attempts => {
                RetryState::RetryExhausted
            }
            ModelError::QuotaExceeded(_) => RetryState::RetryScheduled {
                attempt: attempt + 1,
                delay: config.delay_for(attempt),
            },
            ModelError::NotFound(_) => RetryState::PermanentFailure(FailureKind::ModelUnavailable),
            ModelError::Other(_) => RetryState::PermanentFailure(FailureKind::Unknown),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RetryState::Succeeded | RetryState::PermanentFailure(_) | RetryState::RetryExhausted
        )
    }
}

/// Waits between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

/// Production sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Sleeper that returns immediately and remembers every requested delay
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().clone()
    }

    pub fn total(&self) -> Duration {
        self.delays.lock().iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, delay: Duration) {
        self.delays.lock().push(delay);
    }
}
