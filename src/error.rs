//! Crate-wide error type.
//!
//! `NotifyError` carries the taxonomy from the error handling design:
//! `InvalidInput`, `NotFound`, `Internal`, `Canceled`. Every fallible
//! operation in this crate returns `NotifyResult<T>`.

use std::fmt;

/// Error category. Callers that need to branch on the *kind* of failure
/// (rather than match the message) use this instead of matching on
/// `NotifyError` variants directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Config validation, malformed API response, bad command arguments.
    InvalidInput,
    /// Unknown task/command/notifier/instance.
    NotFound,
    /// Unexpected internal failure — logged, surfaced to the default notifier.
    Internal,
    /// Cooperative stop. Never surfaced as an error message.
    Canceled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Internal => "internal",
            ErrorKind::Canceled => "canceled",
        };
        f.write_str(s)
    }
}

/// Unified error type for the executor, notifier, and provider subsystems.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Task ID has no registered provider.
    #[error("task not supported: {0}")]
    TaskNotSupported(String),

    /// Command ID is not declared by the task's provider.
    #[error("command not supported: {0}")]
    CommandNotSupported(String),

    /// A second instance of a non-`AllowMultiple` (task, command) is live.
    #[error("task already running: {0}")]
    AlreadyRunning(String),

    /// `CancelTask` referenced an instance that is not (or no longer) live.
    #[error("unknown instance: {0}")]
    InstanceUnknown(String),

    /// Settings failed validation (task-level or command-level).
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Notifier ID has no registered handler.
    #[error("notifier not found: {0}")]
    NotifierNotFound(String),

    /// Registering two bot commands under the same derived name.
    #[error("duplicate bot command name: {0}")]
    DuplicateCommand(String),

    /// Cooperative cancellation. Never surfaced as an error notification.
    #[error("canceled")]
    Canceled,

    /// Deadline elapsed while awaiting a cancellable operation.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Transport or decode failure reaching an external HTTP endpoint.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// Catch-all for unexpected internal failures (a provider panic, an
    /// inconsistent internal invariant caught defensively).
    #[error("internal error: {0}")]
    Internal(String),
}

impl NotifyError {
    /// Classify this error into its taxonomy category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            NotifyError::TaskNotSupported(_)
            | NotifyError::CommandNotSupported(_)
            | NotifyError::NotifierNotFound(_) => ErrorKind::NotFound,
            NotifyError::AlreadyRunning(_) | NotifyError::InvalidSettings(_) => {
                ErrorKind::InvalidInput
            }
            NotifyError::InstanceUnknown(_) => ErrorKind::NotFound,
            NotifyError::DuplicateCommand(_) => ErrorKind::InvalidInput,
            NotifyError::Canceled => ErrorKind::Canceled,
            NotifyError::DeadlineExceeded
            | NotifyError::Fetch(_)
            | NotifyError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// `true` iff this is the cooperative-cancellation variant — the one
    /// case the executor must never turn into a user-facing error message.
    pub fn is_canceled(&self) -> bool {
        matches!(self, NotifyError::Canceled)
    }
}

impl From<serde_json::Error> for NotifyError {
    fn from(err: serde_json::Error) -> Self {
        NotifyError::InvalidSettings(err.to_string())
    }
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NotifyError::DeadlineExceeded
        } else {
            NotifyError::Fetch(err.to_string())
        }
    }
}

/// Convenience result type for this crate's fallible operations.
pub type NotifyResult<T> = Result<T, NotifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_classification_matches_taxonomy() {
        assert_eq!(
            NotifyError::TaskNotSupported("x".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            NotifyError::AlreadyRunning("x".into()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(NotifyError::Canceled.kind(), ErrorKind::Canceled);
        assert_eq!(NotifyError::Internal("x".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn is_canceled_only_true_for_canceled_variant() {
        assert!(NotifyError::Canceled.is_canceled());
        assert!(!NotifyError::DeadlineExceeded.is_canceled());
        assert!(!NotifyError::Internal("x".into()).is_canceled());
    }
}
