//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Autopost
///
/// The publish-path variants form a small taxonomy so callers can tell apart
/// failures that may recover later ([`AutopostError::RetriesExhausted`]) from
/// failures that will not ([`AutopostError::Rejected`]).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum AutopostError {
    /// Missing credentials or topics, or an invalid configuration value.
    /// Checked before any network call and never retried.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Timeout, transport failure, 5xx or 429 on a single attempt.
    #[error("Transient network error: {0}")]
    Transient(String),

    /// Every attempt allowed by the retry policy failed transiently.
    #[error("Retries exhausted after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    /// The server rejected the request (4xx other than 429).
    #[error("Request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The generation capability produced nothing usable.
    #[error("No content: {0}")]
    NoContent(String),

    /// The generation capability failed for a reason other than HTTP.
    #[error("Generation error: {0}")]
    Generation(String),

    /// A successful response body could not be interpreted.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AutopostError {
    /// Whether a manual cycle should hand the generated text to the
    /// interactive publish fallback after this error.
    pub fn offers_manual_fallback(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::RetriesExhausted { .. })
    }

    /// Whether this error describes a single failed attempt that the retry
    /// loop may try again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Stable label suitable for structured logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Transient(_) => "transient",
            Self::RetriesExhausted { .. } => "retries_exhausted",
            Self::Rejected { .. } => "rejected",
            Self::NoContent(_) => "no_content",
            Self::Generation(_) => "generation",
            Self::InvalidResponse(_) => "invalid_response",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for Autopost operations
pub type Result<T> = std::result::Result<T, AutopostError>;
