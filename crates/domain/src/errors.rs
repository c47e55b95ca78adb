//! Domain Errors - Business rule violations
//!
//! Contains business logic errors plus the two retrieval failures
//! that cross the domain boundary (embedding and index lookups).

use thiserror::Error;

/// Domain-specific errors representing business rule violations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Business validation: missing or empty query / candidate set
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Business rule: embedding dimension mismatch
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    EmbeddingDimensionMismatch { expected: usize, actual: usize },

    /// The embedding function failed to produce a vector
    #[error("Embedding failed: {0}")]
    EmbeddingFailed(String),

    /// The nearest-neighbour index failed to answer a query
    #[error("Index search failed: {0}")]
    IndexFailed(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Shorthand for [`DomainError::InvalidInput`]
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Check if error is a business validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(self, DomainError::InvalidInput(_))
    }

    /// Get error category for business logic
    pub fn category(&self) -> ErrorCategory {
        match self {
            DomainError::InvalidInput(_) => ErrorCategory::Validation,
            DomainError::EmbeddingDimensionMismatch { .. } => ErrorCategory::BusinessRule,
            DomainError::EmbeddingFailed(_) | DomainError::IndexFailed(_) => {
                ErrorCategory::Retrieval
            }
        }
    }
}

/// Categories of domain errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Input validation errors
    Validation,
    /// Business rule violations
    BusinessRule,
    /// Embedding or index failures
    Retrieval,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categorization() {
        let validation_error = DomainError::invalid_input("query must not be empty");
        assert!(validation_error.is_validation_error());
        assert_eq!(validation_error.category(), ErrorCategory::Validation);

        let mismatch = DomainError::EmbeddingDimensionMismatch {
            expected: 384,
            actual: 3,
        };
        assert!(!mismatch.is_validation_error());
        assert_eq!(mismatch.category(), ErrorCategory::BusinessRule);

        let index = DomainError::IndexFailed("corrupted".to_string());
        assert_eq!(index.category(), ErrorCategory::Retrieval);
    }

    #[test]
    fn test_error_messages() {
        let error = DomainError::EmbeddingDimensionMismatch {
            expected: 384,
            actual: 3,
        };
        assert!(error.to_string().contains("384"));
        assert!(error.to_string().contains("got 3"));
    }
}
