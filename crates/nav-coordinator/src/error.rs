//! Error types for the navigation coordinator
//!
//! Queue errors are delivered through the failing item's completion, guard
//! denials are returned to the caller, validation and storage errors are
//! logged by the persistence manager and never escape it.

use thiserror::Error;

/// Navigation coordinator errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NavigationError {
    /// Host controller missing or not ready when the item reached the head
    #[error("Navigation not ready: host controller unavailable")]
    QueueNotReady,

    /// Malformed command detected at dispatch time
    #[error("Invalid navigation command: {reason}")]
    InvalidCommand { reason: String },

    /// Pending item dropped by an explicit clear
    #[error("Navigation queue cleared")]
    QueueCleared,

    /// Policy refusal from the guard chain
    #[error("Navigation denied: {reason}")]
    GuardDenied {
        reason: String,
        redirect_to: Option<String>,
    },

    /// Structural defect in a navigation state tree
    #[error("Invalid navigation state: {}", errors.join("; "))]
    ValidationError { errors: Vec<String> },

    /// Underlying key-value storage failure
    #[error("Storage error: {reason}")]
    StorageError { reason: String },

    /// Host controller rejected a dispatched command
    #[error("Dispatch failed: {reason}")]
    Dispatch { reason: String },

    /// Record could not be encoded or decoded
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    /// A guard failed to evaluate
    #[error("Guard '{guard}' failed: {reason}")]
    Guard { guard: String, reason: String },
}

impl NavigationError {
    /// Short, stable label used in logs and metric labels.
    pub fn label(&self) -> &'static str {
        match self {
            Self::QueueNotReady => "not_ready",
            Self::InvalidCommand { .. } => "invalid_command",
            Self::QueueCleared => "cleared",
            Self::GuardDenied { .. } => "guard_denied",
            Self::ValidationError { .. } => "validation",
            Self::StorageError { .. } => "storage",
            Self::Dispatch { .. } => "dispatch",
            Self::Serialization { .. } => "serialization",
            Self::Guard { .. } => "guard_error",
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidCommand {
            reason: reason.into(),
        }
    }

    pub(crate) fn storage(err: impl std::fmt::Display) -> Self {
        Self::StorageError {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for NavigationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

/// Result type for navigation operations
pub type NavResult<T> = Result<T, NavigationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_denied_display() {
        let err = NavigationError::GuardDenied {
            reason: "Admin screens are only available to administrators".to_string(),
            redirect_to: Some("HomeScreen".to_string()),
        };
        assert!(err.to_string().contains("administrators"));
        assert_eq!(err.label(), "guard_denied");
    }

    #[test]
    fn test_validation_error_joins_messages() {
        let err = NavigationError::ValidationError {
            errors: vec!["first".to_string(), "second".to_string()],
        };
        assert_eq!(err.to_string(), "Invalid navigation state: first; second");
    }

    #[test]
    fn test_serde_error_conversion() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: NavigationError = parse.unwrap_err().into();
        assert_eq!(err.label(), "serialization");
    }
}
