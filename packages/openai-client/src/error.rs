//! Error types for OpenAI client.

use thiserror::Error;

/// Result type for OpenAI client operations.
pub type Result<T> = std::result::Result<T, OpenAIError>;

/// OpenAI client errors.
#[derive(Debug, Error)]
pub enum OpenAIError {
    /// Network error (connection refused, DNS, TLS)
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete within the client timeout
    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// API error (non-2xx response, rate limit, invalid request, refusal)
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl OpenAIError {
    /// Whether the failure happened before a usable reply arrived.
    ///
    /// Parse errors mean the service answered but the body could not be
    /// read as the expected structure.
    pub fn is_transport(&self) -> bool {
        !matches!(self, OpenAIError::Parse(_))
    }
}
