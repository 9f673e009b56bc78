//! OpenAI implementation of the reasoning service.
//!
//! # Example
//!
//! ```rust,ignore
//! use competitor_analysis::ai::OpenAiReasoner;
//!
//! let reasoner = OpenAiReasoner::new(OpenAIClient::new(api_key));
//! let pipeline = Pipeline::builder(Arc::new(reasoner)).build()?;
//! ```

use async_trait::async_trait;
use openai_client::{
    strict_schema, ContentPart, ImageDetail, OpenAIClient, OpenAIError, StructuredRequest,
};
use tracing::debug;

use crate::error::{AnalysisError, AnalysisOutcome};
use crate::traits::reasoning::{ReasoningRequest, ReasoningService};

/// Sends reasoning requests to the chat completions API with a strict
/// JSON-schema response format.
#[derive(Debug, Clone)]
pub struct OpenAiReasoner {
    client: OpenAIClient,
    image_detail: ImageDetail,
    temperature: f32,
}

impl OpenAiReasoner {
    pub fn new(client: OpenAIClient) -> Self {
        Self {
            client,
            image_detail: ImageDetail::High,
            temperature: 0.3,
        }
    }

    /// Resolution hint for image parts (default: high).
    pub fn with_image_detail(mut self, detail: ImageDetail) -> Self {
        self.image_detail = detail;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Translate a reasoning request into the wire request.
    pub fn to_structured_request(&self, request: &ReasoningRequest) -> StructuredRequest {
        let schema = strict_schema(request.schema.clone());
        let structured = match &request.image {
            Some(image) => StructuredRequest::multimodal(
                &request.model,
                &request.system_prompt,
                vec![
                    ContentPart::text(&request.user_prompt),
                    ContentPart::image_base64(&image.mime_type, &image.base64, self.image_detail),
                ],
                schema,
            ),
            None => StructuredRequest::new(
                &request.model,
                &request.system_prompt,
                &request.user_prompt,
                schema,
            ),
        };
        structured
            .schema_name(&request.schema_name)
            .temperature(self.temperature)
    }
}

fn map_error(e: OpenAIError) -> AnalysisError {
    if e.is_transport() {
        AnalysisError::upstream(e)
    } else {
        AnalysisError::MalformedResponse(e.to_string())
    }
}

#[async_trait]
impl ReasoningService for OpenAiReasoner {
    async fn complete(&self, request: &ReasoningRequest) -> AnalysisOutcome<String> {
        debug!(
            model = %request.model,
            schema = %request.schema_name,
            multimodal = request.is_multimodal(),
            "Sending structured request"
        );
        self.client
            .structured_output(self.to_structured_request(request))
            .await
            .map_err(map_error)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
