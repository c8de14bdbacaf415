//! Transport error types.

use thiserror::Error;

/// Errors surfaced verbatim from a single backend round trip.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced an HTTP response (connect, DNS, TLS, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code returned by the backend.
        status: u16,
        /// Response body, verbatim.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// The configured base URL cannot be used to build request URLs.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ClientError {
    /// Whether the backend reported that the research id does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Server { status: 404, .. })
    }
}
