use thiserror::Error;

/// Errors reported by a generative model client.
///
/// Only quota errors are transient; the generator never retries the others.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Model not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

impl ModelError {
    /// Underlying message without the variant prefix
    pub fn message(&self) -> &str {
        match self {
            ModelError::QuotaExceeded(msg) | ModelError::NotFound(msg) | ModelError::Other(msg) => {
                msg
            }
        }
    }

    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, ModelError::QuotaExceeded(_))
    }
}
