//! Error types for the Open Media SDK.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, OmError>;

/// Errors surfaced by the SDK.
///
/// Provider-level business errors (a non-zero `code` in the response
/// envelope) are deliberately *not* represented here: every endpoint
/// returns the decoded [`Envelope`](crate::models::Envelope) as-is and
/// callers branch on `code` themselves. The only failure this crate
/// raises on its own behalf is [`OmError::NotYetAuthorized`].
#[derive(Debug, Error)]
pub enum OmError {
    /// No valid or refreshable access token exists for the bound openid.
    ///
    /// Callers must send the end user through
    /// [`TokenManager::authorize_url`](crate::auth::TokenManager::authorize_url)
    /// again before retrying.
    #[error("not yet authorized: {reason}")]
    NotYetAuthorized { reason: String },

    /// Transport failure (connection, timeout, non-JSON body).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization failure outside the transport layer.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local I/O failure, e.g. reading a media file for upload.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration or arguments.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl OmError {
    /// Creates a [`OmError::NotYetAuthorized`] with the given reason.
    pub fn not_yet_authorized(reason: impl Into<String>) -> Self {
        Self::NotYetAuthorized {
            reason: reason.into(),
        }
    }

    /// Creates a [`OmError::Config`] error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns true if this error means the caller must re-run the
    /// authorization-code flow.
    pub fn is_not_yet_authorized(&self) -> bool {
        matches!(self, Self::NotYetAuthorized { .. })
    }
}
