//! Structured error values shared by every component (spec §7).
//!
//! Every fallible operation in the kernel returns a [`CoreError`] rather
//! than a bare string. The `kind` drives recovery policy upstream
//! (the collaboration manager's retry logic matches on it instead of
//! substring-sniffing a message, resolving the Open Question in spec.md §9).

use std::fmt;

/// The taxonomy of recoverable and unrecoverable failures a component can
/// surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    InsufficientData,
    SourceUnavailable,
    Timeout,
    Network,
    DependencyFailed,
    WorkerLost,
    QualityDegradation,
    ExportUnsupported,
    Internal,
}

impl ErrorKind {
    /// Whether the collaboration manager's retry policy (spec §4.4) should
    /// re-queue a task failing with this kind.
    pub fn is_retryable_by_default(self) -> bool {
        matches!(self, ErrorKind::Timeout | ErrorKind::Network)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::InsufficientData => "insufficient_data",
            ErrorKind::SourceUnavailable => "source_unavailable",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Network => "network_error",
            ErrorKind::DependencyFailed => "dependency_failed",
            ErrorKind::WorkerLost => "worker_lost",
            ErrorKind::QualityDegradation => "quality_degradation",
            ErrorKind::ExportUnsupported => "export_unsupported",
            ErrorKind::Internal => "internal_error",
        };
        f.write_str(s)
    }
}

/// A structured error value, carrying enough context for both humans
/// (`message`) and machines (`kind`, `metadata` tag on `TaskResult`).
#[derive(Debug, Clone, thiserror::Error, serde::Serialize, serde::Deserialize)]
#[error("{kind}: {message}")]
pub struct CoreError {
    pub kind: ErrorKind,
    pub message: String,
    #[source]
    #[serde(skip)]
    pub cause: Option<Box<CoreError>>,
    pub retryable: bool,
}

impl CoreError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let retryable = kind.is_retryable_by_default();
        Self {
            kind,
            message: message.into(),
            cause: None,
            retryable,
        }
    }

    pub fn with_cause(mut self, cause: CoreError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InsufficientData, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn dependency_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DependencyFailed, message)
    }

    pub fn worker_lost(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::WorkerLost, message)
    }

    pub fn export_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExportUnsupported, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_and_network_are_retryable_by_default() {
        assert!(ErrorKind::Timeout.is_retryable_by_default());
        assert!(ErrorKind::Network.is_retryable_by_default());
        assert!(!ErrorKind::Validation.is_retryable_by_default());
    }

    #[test]
    fn display_matches_error_tag() {
        assert_eq!(ErrorKind::DependencyFailed.to_string(), "dependency_failed");
    }
}
