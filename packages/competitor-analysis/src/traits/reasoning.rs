//! Reasoning service trait: the remote structured-analysis backend.
//!
//! Implementations only move bytes. Prompt building, reply decoding and
//! validation live in [`crate::pipeline::ReasoningClient`], so every backend
//! gets the same schema checks.

use async_trait::async_trait;

use crate::error::AnalysisOutcome;
use crate::types::content::EncodedImage;

/// One structured-analysis request.
#[derive(Debug, Clone)]
pub struct ReasoningRequest {
    /// Model identifier
    pub model: String,

    /// Role instructions
    pub system_prompt: String,

    /// Content or context for the model
    pub user_prompt: String,

    /// Visual payload; present means a multimodal request
    pub image: Option<EncodedImage>,

    /// Name of the expected reply schema
    pub schema_name: String,

    /// Strict JSON schema the reply must follow
    pub schema: serde_json::Value,
}

impl ReasoningRequest {
    /// Whether this request carries an image.
    pub fn is_multimodal(&self) -> bool {
        self.image.is_some()
    }
}

/// Remote structured-analysis backend.
#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// Send the request and return the raw JSON text of the reply.
    ///
    /// Transport failures (unreachable, timeout, non-success status) are
    /// `AnalysisError::UpstreamFailure`; a reply that arrives but cannot be
    /// read is `AnalysisError::MalformedResponse`.
    async fn complete(&self, request: &ReasoningRequest) -> AnalysisOutcome<String>;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}
