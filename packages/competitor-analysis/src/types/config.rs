//! Configuration for the analysis pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Every tunable of the pipeline.
///
/// Timeouts are stored as whole seconds so the struct round-trips through
/// plain config files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum characters accepted by `analyze_text`.
    ///
    /// Default: 10.
    pub min_text_chars: usize,

    /// Combined PDF text is cut to this many characters before analysis.
    ///
    /// Default: 5000.
    pub pdf_max_chars: usize,

    /// Length of the extracted-text preview returned with a PDF analysis.
    ///
    /// Default: 500.
    pub pdf_preview_chars: usize,

    /// Bound on the fast-path HTTP fetch. Default: 15.
    pub fetch_timeout_secs: u64,

    /// Bound on one browser render, screenshot included. Default: 60.
    pub render_timeout_secs: u64,

    /// Bound on decoding one PDF. Default: 30.
    pub pdf_timeout_secs: u64,

    /// Bound on one reasoning-service call. Default: 120.
    pub analysis_timeout_secs: u64,

    /// Parallel browser sessions allowed. Default: 1 (serialized).
    pub render_concurrency: usize,

    /// Model used for text-only requests.
    pub text_model: String,

    /// Model used for requests that carry an image.
    pub vision_model: String,

    /// User-Agent sent by the fast-path fetcher.
    pub user_agent: String,

    /// Allow URLs pointing at loopback or private networks.
    ///
    /// Default: false.
    pub allow_private_hosts: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_text_chars: 10,
            pdf_max_chars: 5000,
            pdf_preview_chars: 500,
            fetch_timeout_secs: 15,
            render_timeout_secs: 60,
            pdf_timeout_secs: 30,
            analysis_timeout_secs: 120,
            render_concurrency: 1,
            text_model: "gpt-4o-mini".to_string(),
            vision_model: "gpt-4o".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            allow_private_hosts: false,
        }
    }
}

impl PipelineConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    pub fn pdf_timeout(&self) -> Duration {
        Duration::from_secs(self.pdf_timeout_secs)
    }

    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_secs(self.analysis_timeout_secs)
    }

    /// Render permits, never below one.
    pub fn render_permits(&self) -> usize {
        self.render_concurrency.max(1)
    }

    /// Set the PDF character cap.
    pub fn with_pdf_max_chars(mut self, max: usize) -> Self {
        self.pdf_max_chars = max;
        self
    }

    /// Set the fast-path fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_secs = timeout.as_secs();
        self
    }

    /// Set the browser render timeout.
    pub fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout_secs = timeout.as_secs();
        self
    }

    /// Set the reasoning-service timeout.
    pub fn with_analysis_timeout(mut self, timeout: Duration) -> Self {
        self.analysis_timeout_secs = timeout.as_secs();
        self
    }

    /// Set how many browser renders may run at once.
    pub fn with_render_concurrency(mut self, permits: usize) -> Self {
        self.render_concurrency = permits;
        self
    }

    /// Set both models.
    pub fn with_models(mut self, text: impl Into<String>, vision: impl Into<String>) -> Self {
        self.text_model = text.into();
        self.vision_model = vision.into();
        self
    }

    /// Allow or forbid private-network URLs.
    pub fn with_private_hosts(mut self, allow: bool) -> Self {
        self.allow_private_hosts = allow;
        self
    }
}
