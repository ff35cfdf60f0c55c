//! Error types for the opsmgr client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, protocol, and query validation errors.

use thiserror::Error;

/// The unified error type for opsmgr operations.
///
/// Covers all failure modes in the client, with explicit variants so
/// callers can handle specific cases.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (rejected credentials, incomplete session).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The backend answered with a non-success status.
    ///
    /// The raw response body is preserved for diagnostics.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The backend signalled session expiry again on the retried call.
    #[error("session expired again after re-authentication")]
    SessionRetryExhausted,

    /// A request body could not be serialized. Nothing was sent.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// A response body could not be parsed into the expected shape.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// A query payload carried an unrecognized `type` discriminator.
    #[error("unknown query type: '{0}'")]
    UnknownQueryType(String),

    /// A query payload failed structural validation.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A resource call named an operation the router does not know.
    #[error("unknown resource operation: '{0}'")]
    UnknownResource(String),

    /// Connection settings failed validation at construction time.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Where a failure originated, from the caller's point of view.
///
/// Downstream failures are backend outages or rejections the operator
/// of the monitoring backend has to act on; local failures are bad
/// input the caller can fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorOrigin {
    Downstream,
    Local,
}

impl Error {
    /// Classify this error for the top-level query dispatch layer.
    pub fn origin(&self) -> ErrorOrigin {
        match self {
            Error::Encode(_)
            | Error::UnknownQueryType(_)
            | Error::InvalidQuery(_)
            | Error::UnknownResource(_)
            | Error::InvalidSettings(_) => ErrorOrigin::Local,
            _ => ErrorOrigin::Downstream,
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(TransportError::from(err))
    }
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The backend rejected the login exchange.
    #[error("authentication rejected with status {status}")]
    Rejected { status: u16 },

    /// The login response was missing the session or CSRF cookie.
    #[error("incomplete session: response is missing session cookies")]
    IncompleteSession,

    /// Re-authentication after a session-expiry status failed.
    ///
    /// Carries the status of the original response the refresh was
    /// trying to recover from.
    #[error("session refresh after status {original_status} failed: {source}")]
    RefreshFailed {
        original_status: u16,
        #[source]
        source: Box<Error>,
    },
}
