//! Domain error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Transcript violation: {0}")]
    TranscriptViolation(String),

    #[error("Invalid run state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Unknown export format: {0}")]
    UnknownExportFormat(String),
}

/// Classification of a failed model call.
///
/// Mirrors the gateway error taxonomy so a [`RunFailure`](crate::RunFailure)
/// can be recorded and exported without depending on the application layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Authentication,
    RateLimited,
    Timeout,
    Network,
    InvalidResponse,
    EmptyResponse,
    RequestRejected,
    InvalidInput,
    /// The turn loop ended without reaching a terminal state
    Aborted,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Authentication => "authentication",
            FailureKind::RateLimited => "rate_limited",
            FailureKind::Timeout => "timeout",
            FailureKind::Network => "network",
            FailureKind::InvalidResponse => "invalid_response",
            FailureKind::EmptyResponse => "empty_response",
            FailureKind::RequestRejected => "request_rejected",
            FailureKind::InvalidInput => "invalid_input",
            FailureKind::Aborted => "aborted",
        }
    }

    /// Whether the Model Client may retry this failure before surfacing it.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FailureKind::RateLimited | FailureKind::Timeout | FailureKind::Network
        )
    }

    /// User-facing class of this failure.
    pub fn class(&self) -> ErrorClass {
        match self {
            FailureKind::Authentication | FailureKind::RequestRejected | FailureKind::InvalidInput => {
                ErrorClass::Configuration
            }
            FailureKind::RateLimited | FailureKind::Timeout | FailureKind::Network => {
                ErrorClass::Transient
            }
            FailureKind::InvalidResponse | FailureKind::EmptyResponse => ErrorClass::Provider,
            FailureKind::Aborted => ErrorClass::Internal,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the user should do about a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Fix your configuration (key, endpoint, model name, inputs).
    Configuration,
    /// Temporary provider or network problem; trying again may work.
    Transient,
    /// The provider answered, but with nothing usable.
    Provider,
    /// llm-duel itself failed.
    Internal,
}

impl ErrorClass {
    /// Human-readable hint shown next to a failure.
    pub fn hint(&self) -> &'static str {
        match self {
            ErrorClass::Configuration => {
                "check your configuration (API key, base URL, model name)"
            }
            ErrorClass::Transient => "temporary provider problem, try again",
            ErrorClass::Provider => "the provider returned an unusable response",
            ErrorClass::Internal => "the run stopped unexpectedly, rerun with -vv for details",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        assert!(FailureKind::RateLimited.is_retryable());
        assert!(FailureKind::Timeout.is_retryable());
        assert!(FailureKind::Network.is_retryable());
        assert!(!FailureKind::Authentication.is_retryable());
        assert!(!FailureKind::InvalidResponse.is_retryable());
        assert!(!FailureKind::EmptyResponse.is_retryable());
    }

    #[test]
    fn test_failure_class_distinguishes_config_from_transient() {
        assert_eq!(FailureKind::Authentication.class(), ErrorClass::Configuration);
        assert_eq!(FailureKind::RequestRejected.class(), ErrorClass::Configuration);
        assert_eq!(FailureKind::RateLimited.class(), ErrorClass::Transient);
        assert_eq!(FailureKind::Network.class(), ErrorClass::Transient);
        assert_eq!(FailureKind::EmptyResponse.class(), ErrorClass::Provider);
        assert_eq!(FailureKind::Aborted.class(), ErrorClass::Internal);
        assert!(!FailureKind::Aborted.is_retryable());
    }

    #[test]
    fn test_failure_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::RateLimited).unwrap();
        assert_eq!(json, "\"rate_limited\"");
        assert_eq!(FailureKind::RateLimited.to_string(), "rate_limited");
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = DomainError::InvalidTransition {
            from: "completed".to_string(),
            to: "running".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid run state transition: completed -> running"
        );
    }
}
