//! Typed errors for the analysis pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell
//! extraction, analysis and validation failures apart.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while turning an artifact into extracted content.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The fetch or render did not finish in time
    #[error("timed out after {}s loading {target}", .after.as_secs())]
    Timeout { target: String, after: Duration },

    /// Network failure other than a timeout
    #[error("failed to load {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    /// MIME type outside the allow-list
    #[error("unsupported media type {mime_type}; allowed: {allowed}")]
    UnsupportedMediaType { mime_type: String, allowed: String },

    /// Nothing usable was extracted
    #[error("no extractable content in {what}")]
    EmptyExtraction { what: String },

    /// The PDF byte stream could not be decoded
    #[error("could not decode PDF: {0}")]
    PdfDecode(String),

    /// The rendering engine failed on a page it did reach
    #[error("rendering failed for {url}: {reason}")]
    RenderFailed { url: String, reason: String },
}

/// Errors raised by the reasoning client.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The service was unreachable, timed out or returned a non-success status
    #[error("reasoning service failed: {0}")]
    UpstreamFailure(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The reply did not match the expected schema or violated its ranges
    #[error("malformed reasoning reply: {0}")]
    MalformedResponse(String),
}

impl AnalysisError {
    /// Wrap any error as an upstream failure.
    pub fn upstream(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::UpstreamFailure(e.into())
    }
}

/// Caller-side input and invariant violations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A score fell outside the inclusive 0..=10 range
    #[error("{field} must be within 0..=10, got {value}")]
    ScoreOutOfRange { field: &'static str, value: i64 },

    /// Text shorter than the minimum length
    #[error("text must be at least {min} characters, got {len}")]
    InputTooShort { len: usize, min: usize },

    /// URL rejected before any network access
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Any failure of one pipeline invocation.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// The caller abandoned the invocation
    #[error("operation cancelled")]
    Cancelled,
}

/// Result type alias for extraction operations.
pub type ExtractionResult<T> = std::result::Result<T, ExtractionError>;

/// Result type alias for reasoning-client operations.
pub type AnalysisOutcome<T> = std::result::Result<T, AnalysisError>;

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
