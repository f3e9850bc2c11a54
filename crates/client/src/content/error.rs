//! Content API client error types.

use std::sync::Arc;

/// Errors from the Ghost Content API client.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// API URL or Content API key not configured.
    #[error("missing content API credentials: {0}")]
    MissingCredentials(String),

    /// Invalid browse parameters.
    #[error("invalid browse parameters: {0}")]
    InvalidParams(String),

    /// The configured API URL does not parse.
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),

    /// Authentication failed (invalid content API key).
    #[error("authentication failed: check content API key")]
    Unauthorized,

    /// Resource endpoint not found.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Rate limited by the Content API.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ContentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { ContentError::Timeout } else { ContentError::Network(Arc::new(err)) }
    }
}
