//! GenerationOutcome - terminal value of one generation request

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a generation request terminated without text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Quota kept being exceeded until the attempt ceiling was reached
    QuotaExceeded,
    /// The model identifier is invalid or not supported
    ModelUnavailable,
    /// Any other failure reported by the model client
    Unknown,
    /// The caller abandoned the request
    Cancelled,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::QuotaExceeded => "quota_exceeded",
            FailureKind::ModelUnavailable => "model_unavailable",
            FailureKind::Unknown => "unknown",
            FailureKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one generation request. Created per invocation, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationOutcome {
    Success { text: String },
    Failure { kind: FailureKind, message: String },
}

impl GenerationOutcome {
    pub fn success(text: impl Into<String>) -> Self {
        Self::Success { text: text.into() }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Success { text } => Some(text),
            Self::Failure { .. } => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        let ok = GenerationOutcome::success("analysis");
        assert!(ok.is_success());
        assert_eq!(ok.text(), Some("analysis"));
        assert_eq!(ok.failure_kind(), None);

        let failed = GenerationOutcome::failure(FailureKind::ModelUnavailable, "404");
        assert!(!failed.is_success());
        assert_eq!(failed.text(), None);
        assert_eq!(failed.failure_kind(), Some(FailureKind::ModelUnavailable));
    }

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let failed = GenerationOutcome::failure(FailureKind::QuotaExceeded, "limits");
        let json = serde_json::to_value(&failed).unwrap();

        assert_eq!(json["status"], "failure");
        assert_eq!(json["kind"], "quota_exceeded");
        assert_eq!(json["message"], "limits");
    }
}
