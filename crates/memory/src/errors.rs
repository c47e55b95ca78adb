//! Ошибки слоя хранения: корпус, эмбеддинги, векторный индекс

use domain::DomainError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed corpus {path} (line {line})")]
    CorpusFormat {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Index snapshot error")]
    Snapshot(#[from] bincode::Error),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Index does not match corpus: {0}")]
    CorpusMismatch(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Index search failed: {0}")]
    Index(String),
}

pub type MemoryResult<T> = Result<T, MemoryError>;

impl MemoryError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<MemoryError> for DomainError {
    fn from(err: MemoryError) -> Self {
        match err {
            MemoryError::DimensionMismatch { expected, actual } => {
                DomainError::EmbeddingDimensionMismatch { expected, actual }
            }
            MemoryError::Embedding(msg) => DomainError::EmbeddingFailed(msg),
            other => DomainError::IndexFailed(error_chain(&other)),
        }
    }
}

/// Message with every source appended, for layers that keep only a string
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_into_domain_error() {
        let err: DomainError = MemoryError::DimensionMismatch {
            expected: 4,
            actual: 3,
        }
        .into();
        assert_eq!(
            err,
            DomainError::EmbeddingDimensionMismatch {
                expected: 4,
                actual: 3
            }
        );

        let err: DomainError = MemoryError::Embedding("model offline".into()).into();
        assert_eq!(err, DomainError::EmbeddingFailed("model offline".into()));

        let err: DomainError = MemoryError::Index("corrupt graph".into()).into();
        assert!(matches!(err, DomainError::IndexFailed(msg) if msg.contains("corrupt graph")));
    }

    #[test]
    fn test_io_error_cause_reported_once() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = MemoryError::io("data/patents.json", source);

        assert_eq!(err.to_string(), "Failed to read data/patents.json");
        assert!(std::error::Error::source(&err).is_some());

        let err: DomainError = err.into();
        assert_eq!(
            err,
            DomainError::IndexFailed("Failed to read data/patents.json: no such file".into())
        );
    }
}
