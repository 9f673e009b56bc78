//! Reasoning client: builds requests, bounds the remote call and validates
//! the typed reply.

use std::sync::Arc;
use std::time::{Duration, Instant};

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::prompts;
use crate::error::{AnalysisError, AnalysisOutcome};
use crate::traits::reasoning::{ReasoningRequest, ReasoningService};
use crate::types::analysis::{
    AnalysisResult, ImageAnalysis, ImageAnalysisReply, TextAnalysis, TextAnalysisReply,
};
use crate::types::config::PipelineConfig;
use crate::types::content::ExtractedContent;

/// Schema name sent with text-only requests.
pub const TEXT_SCHEMA_NAME: &str = "competitor_text_analysis";

/// Schema name sent with multimodal requests.
pub const IMAGE_SCHEMA_NAME: &str = "competitor_image_analysis";

/// Draft-07 JSON schema of a reply type.
pub fn reply_schema<T: JsonSchema>() -> serde_json::Value {
    serde_json::to_value(schema_for!(T)).unwrap_or_default()
}

/// Turns extracted content into a validated [`AnalysisResult`].
///
/// Content with an image payload (uploads and webpage screenshots) becomes a
/// multimodal request answered with an [`ImageAnalysis`]; everything else is a
/// text request answered with a [`TextAnalysis`]. No retries.
#[derive(Clone)]
pub struct ReasoningClient {
    service: Arc<dyn ReasoningService>,
    text_model: String,
    vision_model: String,
    timeout: Duration,
}

impl ReasoningClient {
    pub fn new(service: Arc<dyn ReasoningService>, config: &PipelineConfig) -> Self {
        Self {
            service,
            text_model: config.text_model.clone(),
            vision_model: config.vision_model.clone(),
            timeout: config.analysis_timeout(),
        }
    }

    /// Bound on one remote call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build the request for `content` without sending it.
    pub fn build_request(&self, content: &ExtractedContent) -> ReasoningRequest {
        match content.image_payload() {
            Some(image) => ReasoningRequest {
                model: self.vision_model.clone(),
                system_prompt: prompts::VISION_SYSTEM_PROMPT.to_string(),
                user_prompt: prompts::vision_prompt(content),
                image: Some(image.clone()),
                schema_name: IMAGE_SCHEMA_NAME.to_string(),
                schema: reply_schema::<ImageAnalysisReply>(),
            },
            None => ReasoningRequest {
                model: self.text_model.clone(),
                system_prompt: prompts::TEXT_SYSTEM_PROMPT.to_string(),
                user_prompt: prompts::text_prompt(content),
                image: None,
                schema_name: TEXT_SCHEMA_NAME.to_string(),
                schema: reply_schema::<TextAnalysisReply>(),
            },
        }
    }

    /// Analyse content with one bounded call to the reasoning service.
    pub async fn analyze(&self, content: &ExtractedContent) -> AnalysisOutcome<AnalysisResult> {
        let request = self.build_request(content);
        let started = Instant::now();

        info!(
            backend = self.service.name(),
            kind = ?content.source_kind(),
            model = %request.model,
            multimodal = request.is_multimodal(),
            "Requesting analysis"
        );

        let reply = tokio::time::timeout(self.timeout, self.service.complete(&request))
            .await
            .map_err(|_| {
                warn!(timeout_secs = self.timeout.as_secs(), "Reasoning service timed out");
                AnalysisError::upstream(format!(
                    "no reply within {}s",
                    self.timeout.as_secs()
                ))
            })??;

        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            reply_chars = reply.len(),
            "Reasoning reply received"
        );

        let result = if request.is_multimodal() {
            let reply: ImageAnalysisReply = decode_reply(&reply)?;
            AnalysisResult::Image(
                ImageAnalysis::try_from(reply)
                    .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?,
            )
        } else {
            let reply: TextAnalysisReply = decode_reply(&reply)?;
            AnalysisResult::Text(
                TextAnalysis::try_from(reply)
                    .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?,
            )
        };

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            variant = if request.is_multimodal() { "image" } else { "text" },
            "Analysis complete"
        );
        Ok(result)
    }
}

impl std::fmt::Debug for ReasoningClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReasoningClient")
            .field("service", &self.service.name())
            .field("text_model", &self.text_model)
            .field("vision_model", &self.vision_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Strip Markdown code fences around a JSON reply.
fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line, if any
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

fn decode_reply<T: DeserializeOwned>(reply: &str) -> AnalysisOutcome<T> {
    serde_json::from_str(strip_code_fences(reply)).map_err(|e| {
        warn!(error = %e, "Reply does not match the expected schema");
        AnalysisError::MalformedResponse(e.to_string())
    })
}
