//! Error types for the portal API client.
//!
//! # Design
//! Each failure mode is a tagged variant so callers can match on it instead
//! of inspecting message strings. `HttpError` carries only the status: the
//! endpoints that report it have no structured error body. The assignment and
//! update endpoints do, so their variants carry the best-effort `reason`.

/// Errors returned by `PortalClient` parse methods and `PortalApi` calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The transport could not complete the exchange (connection refused,
    /// DNS failure, body read aborted).
    #[error("network error: {0}")]
    NetworkError(String),

    /// The envelope was missing, unparsable, or lacked an expected field.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The server returned a non-2xx status.
    #[error("HTTP {status}")]
    HttpError { status: u16 },

    /// Automatic student assignment was rejected.
    #[error("assignment failed: {reason}")]
    AssignmentError { reason: String },

    /// The user update was rejected.
    #[error("update failed: {reason}")]
    UpdateError { reason: String },

    /// The call was refused before any request was issued.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl ApiError {
    /// The HTTP status behind this error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpError { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::NetworkError(err.to_string())
    }
}
