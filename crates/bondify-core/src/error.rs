//! Error types for API calls and review sessions.
//!
//! `ApiError` is defined here rather than in `bondify-client` so the session
//! and game bridge can classify failures (e.g. "already exists") without
//! depending on the HTTP layer.

use thiserror::Error;

/// Result alias for calls against an `SrsBackend`.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur when talking to the bondify API.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Missing, expired, or rejected credentials (HTTP 401/403).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The addressed resource does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The write conflicts with existing state (HTTP 409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The API returned some other error response.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Returns `true` if the failure means the word is already on the server.
    ///
    /// The server reports duplicates as HTTP 409, but older deployments
    /// answer with a generic error whose message says "already", so both
    /// are accepted.
    pub fn is_already_exists(&self) -> bool {
        match self {
            ApiError::Conflict(_) => true,
            other => other.to_string().to_lowercase().contains("already"),
        }
    }

    /// Returns `true` if the user has to log in again.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// Classify an HTTP error status with the message extracted from its body.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => ApiError::Unauthorized(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            _ => ApiError::Api { status, message },
        }
    }
}

/// Errors returned by `ReviewSession` operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A rating submission is already in flight.
    #[error("a rating is already being submitted")]
    Busy,

    /// The session is not showing a card.
    #[error("no card is being reviewed")]
    NotReviewing,

    /// A rating was submitted before the answer was shown.
    #[error("the answer has not been revealed yet")]
    NotRevealed,

    #[error(transparent)]
    Api(#[from] ApiError),
}
