//! Error types for the sync engine.

use crate::executor::ExecutionReport;
use cardsync_codec::DocumentError;
use thiserror::Error;

/// Result type for remote card service calls.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors returned by a remote card service.
///
/// Every variant is fatal for the current run; nothing is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Network or transport error (no response received).
    #[error("transport error: {0}")]
    Transport(String),

    /// Credentials were rejected.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The addressed deck or card does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The service answered with an unexpected status.
    #[error("server returned status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The response could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Errors that can occur while pulling or pushing a deck.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The local document could not be decoded.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Fetching the remote deck failed; nothing was planned.
    #[error("failed to fetch cards of deck {deck_id} after {pages_discarded} page(s): {source}")]
    RemoteFetchFailed {
        /// Deck being fetched.
        deck_id: String,
        /// Pages already retrieved and thrown away.
        pages_discarded: usize,
        /// Underlying service error.
        #[source]
        source: ServiceError,
    },

    /// A write failed; the remaining plan was abandoned.
    #[error(
        "remote write failed on {operation}: {source} ({completed} completed, {not_attempted} not attempted)",
        completed = .report.applied.len(),
        not_attempted = .report.not_attempted.len()
    )]
    RemoteWriteFailed {
        /// The operation that failed.
        operation: String,
        /// Underlying service error.
        #[source]
        source: ServiceError,
        /// What was applied before the failure and what never ran.
        report: Box<ExecutionReport>,
    },

    /// A remote card cannot be written to a local document without changing.
    #[error("card {remote_id} cannot be written to a local document: {reason}")]
    UnrepresentableCard {
        /// Id of the remote card.
        remote_id: String,
        /// What would go wrong.
        reason: String,
    },

    /// A service call outside fetch or execution failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SyncError {
    /// Returns the partial execution report of a failed write, if any.
    pub fn report(&self) -> Option<&ExecutionReport> {
        match self {
            SyncError::RemoteWriteFailed { report, .. } => Some(report),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ServiceError::Status {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "server returned status 500: boom");

        let err = SyncError::RemoteFetchFailed {
            deck_id: "d1".into(),
            pages_discarded: 2,
            source: ServiceError::Transport("reset".into()),
        };
        assert!(err.to_string().contains("d1"));
        assert!(err.to_string().contains("2 page(s)"));
        assert!(err.report().is_none());
    }

    #[test]
    fn write_failure_exposes_report() {
        let err = SyncError::RemoteWriteFailed {
            operation: "delete c9".into(),
            source: ServiceError::NotFound("c9".into()),
            report: Box::default(),
        };
        assert!(err.to_string().contains("0 completed, 0 not attempted"));
        assert!(err.report().is_some());
    }

    #[test]
    fn document_errors_convert() {
        let err: SyncError = DocumentError::malformed(1, 1, "bad").into();
        assert!(matches!(err, SyncError::Document(_)));
    }
}
