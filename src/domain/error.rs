//! Error types for the jobsift engine.
//!
//! This module defines the centralized error type [`JobsiftError`], the
//! cloneable [`ErrorInfo`] projection stored in UI-facing state, and a type
//! alias [`Result`] used throughout the crate. All errors are implemented
//! using the `thiserror` crate.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// The main error type for jobsift operations.
///
/// Transport failures, non-2xx API answers and timeouts are the three kinds a
/// user can see. The remaining variants are programmer or setup errors that
/// fail fast.
///
/// A response discarded for being stale is deliberately absent here: it is a
/// normal outcome of the sequencing cores, never an error.
#[derive(Debug, Error)]
pub enum JobsiftError {
    /// The transport failed before an HTTP status was received.
    #[error("Network error: {0}")]
    Network(String),

    /// The API answered with a non-success status or rejected the operation.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code, or 200 when the body reported `success: false`.
        status: u16,
        /// Message extracted from the response body when present.
        message: String,
    },

    /// The request did not settle within the configured timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// A facet name that does not exist was used.
    #[error("Unknown facet: {0}")]
    UnknownFacet(String),

    /// A value that cannot belong to the named enum facet was used.
    #[error("Invalid value {value:?} for facet {facet}")]
    InvalidFacetValue {
        /// Facet the value was toggled on.
        facet: String,
        /// The rejected raw value.
        value: String,
    },

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The owning session or store was disposed before the call completed.
    #[error("Session disposed")]
    Disposed,

    /// A background request was needed but no tokio runtime was reachable.
    #[error("No async runtime available")]
    NoRuntime,
}

impl From<reqwest::Error> for JobsiftError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// A specialized `Result` type for jobsift operations.
pub type Result<T> = std::result::Result<T, JobsiftError>;

/// Coarse classification of a user-visible failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Api,
    Timeout,
    Internal,
}

/// Cloneable description of a failure, suitable for state and notifications.
///
/// `JobsiftError` owns non-cloneable sources (I/O errors), so state machines
/// keep this projection instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
    /// Whether retrying the same operation can reasonably succeed.
    pub retryable: bool,
}

impl From<&JobsiftError> for ErrorInfo {
    fn from(err: &JobsiftError) -> Self {
        let (kind, retryable) = match err {
            JobsiftError::Network(_) => (ErrorKind::Network, true),
            JobsiftError::Timeout(_) => (ErrorKind::Timeout, true),
            // 4xx other than 408/429 will not change on retry
            JobsiftError::Api { status, .. } => (
                ErrorKind::Api,
                *status >= 500 || *status == 408 || *status == 429 || *status == 200,
            ),
            _ => (ErrorKind::Internal, false),
        };
        Self {
            kind,
            message: err.to_string(),
            retryable,
        }
    }
}

impl From<JobsiftError> for ErrorInfo {
    fn from(err: JobsiftError) -> Self {
        Self::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_are_retryable() {
        let info = ErrorInfo::from(JobsiftError::Network("connection reset".into()));
        assert_eq!(info.kind, ErrorKind::Network);
        assert!(info.retryable);

        let info = ErrorInfo::from(JobsiftError::Timeout(Duration::from_secs(30)));
        assert_eq!(info.kind, ErrorKind::Timeout);
        assert!(info.retryable);
    }

    #[test]
    fn client_errors_are_not_retryable() {
        let info = ErrorInfo::from(JobsiftError::Api {
            status: 404,
            message: "application not found".into(),
        });
        assert_eq!(info.kind, ErrorKind::Api);
        assert!(!info.retryable);
        assert!(info.message.contains("application not found"));

        let info = ErrorInfo::from(JobsiftError::Api {
            status: 503,
            message: "maintenance".into(),
        });
        assert!(info.retryable);
    }
}
