//! Error types for advisor-llm

use thiserror::Error;

/// Completion client error type
#[derive(Debug, Error)]
pub enum Error {
    /// Client not configured
    #[error("client not configured: {0}")]
    NotConfigured(String),

    /// Network-level failure reaching the API endpoint
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success response from the API endpoint
    #[error("upstream error ({status}): {body}")]
    Upstream {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Response body could not be decoded
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
