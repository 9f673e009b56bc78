//! Pure OpenAI REST API client
//!
//! A small client for the OpenAI chat completions API with no domain-specific
//! logic. Supports strict JSON-schema structured outputs with plain or
//! multimodal (text + image) user turns.
//!
//! # Example
//!
//! ```rust,ignore
//! use openai_client::{strict_schema, OpenAIClient, StructuredRequest};
//!
//! let client = OpenAIClient::new(api_key);
//!
//! let json = client
//!     .structured_output(StructuredRequest::new(
//!         "gpt-4o-mini",
//!         system_prompt,
//!         user_prompt,
//!         strict_schema(schema),
//!     ))
//!     .await?;
//! ```

pub mod error;
pub mod schema;
pub mod types;

pub use error::{OpenAIError, Result};
pub use schema::strict_schema;
pub use types::*;

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Pure OpenAI API client.
#[derive(Clone)]
pub struct OpenAIClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout (connect + full response).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Structured output with JSON schema.
    ///
    /// Uses OpenAI's `json_schema` response format. Returns the raw JSON text
    /// of the first choice; decoding is left to the caller.
    pub async fn structured_output(&self, request: StructuredRequest) -> Result<String> {
        let start = std::time::Instant::now();
        let multimodal = request.messages.iter().any(Message::has_image);
        let raw = self.post_chat(&request).await?;

        if let Some(usage) = &raw.usage {
            debug!(
                model = %request.model,
                multimodal,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                duration_ms = start.elapsed().as_millis(),
                "OpenAI structured output"
            );
        }

        first_content(raw)
    }

    async fn post_chat<B: Serialize>(&self, body: &B) -> Result<types::ChatResponseRaw> {
        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "OpenAI API error");
            return Err(OpenAIError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        response
            .json()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.transport_error(e)
                } else {
                    OpenAIError::Parse(e.to_string())
                }
            })
    }

    fn transport_error(&self, e: reqwest::Error) -> OpenAIError {
        if e.is_timeout() {
            warn!(timeout_secs = self.timeout.as_secs(), "OpenAI request timed out");
            OpenAIError::Timeout {
                secs: self.timeout.as_secs(),
            }
        } else {
            warn!(error = %e, "OpenAI request failed");
            OpenAIError::Network(e.to_string())
        }
    }
}

fn first_content(raw: types::ChatResponseRaw) -> Result<String> {
    let message = raw
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| OpenAIError::Parse("No choices in OpenAI response".into()))?;

    if let Some(refusal) = message.refusal {
        return Err(OpenAIError::Api {
            status: 200,
            message: format!("model refused: {}", refusal),
        });
    }

    message
        .content
        .ok_or_else(|| OpenAIError::Parse("Empty message content in OpenAI response".into()))
}
