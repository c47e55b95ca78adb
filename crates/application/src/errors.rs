//! Application Layer Errors
//!
//! Определяет ошибки Application Layer с четкой категоризацией
//! и mapping на Domain Layer errors и HTTP статусы.

use domain::errors::DomainError;
use thiserror::Error;

/// Основные ошибки Application Layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain layer errors
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Validation errors
    #[error("{message}")]
    Validation { message: String },

    /// Infrastructure errors (corpus, index, model client setup)
    #[error("Infrastructure error: {message}")]
    Infrastructure { message: String },
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;

impl ApplicationError {
    /// Create validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create infrastructure error
    pub fn infrastructure<S: Into<String>>(message: S) -> Self {
        Self::Infrastructure {
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        match self {
            Self::Validation { .. } => true,
            Self::Domain(e) => e.is_validation_error(),
            Self::Infrastructure { .. } => false,
        }
    }

    /// HTTP status the API handlers answer with
    pub fn status_code(&self) -> u16 {
        if self.is_validation() {
            400
        } else {
            500
        }
    }

    /// Get error category for logs
    pub fn category(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::InvalidInput(_)) | Self::Validation { .. } => "validation",
            Self::Domain(DomainError::EmbeddingDimensionMismatch { .. }) => "business_rule",
            Self::Domain(_) => "retrieval",
            Self::Infrastructure { .. } => "infrastructure",
        }
    }
}
