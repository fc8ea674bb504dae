//! Error types for advisor-tools

use thiserror::Error;

/// Tool error type
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or missing arguments, detected before any network call
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// One or more sub-tool calls returned an error result
    #[error("{0}")]
    Subtool(String),

    /// Completion call failed
    #[error(transparent)]
    Llm(#[from] advisor_llm::Error),

    /// GitHub API responded with a non-success status
    #[error("github api error ({status}): {message}")]
    GitHub {
        /// HTTP status code
        status: u16,
        /// Error message from the response body
        message: String,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
