//! Webpage extraction: fast fetch or browser render, then route to vision or
//! text analysis.
//!
//! ```text
//! Start ──fast──▶ FastFetch ─────┐
//!   │                            ├──▶ Parsed ──screenshot──▶ AnalyzeViaVision ──▶ Done
//!   └───full──▶ RenderedFetch ───┘       └────otherwise────▶ AnalyzeViaText ────▶ Done
//!
//! Any fetch or render error ──▶ Failed
//! ```
//!
//! Vision is chosen whenever a screenshot exists. Text is the fallback in
//! every other case, even when the outline is empty; only `Failed` stops the
//! invocation before analysis.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::error::{ExtractionError, ExtractionResult};
use crate::extractors::markup::parse_outline;
use crate::traits::fetcher::PageFetcher;
use crate::traits::renderer::{PageRenderer, RenderedPage};
use crate::types::config::PipelineConfig;
use crate::types::content::{EncodedImage, ExtractedContent};

/// Caller intent for a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// One plain HTTP fetch, text analysis only
    Fast,
    /// Browser render with screenshot, vision analysis when possible
    Full,
}

/// States of one webpage invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebpageState {
    Start,
    FastFetch,
    RenderedFetch,
    Parsed,
    AnalyzeViaVision,
    AnalyzeViaText,
    Done,
    Failed,
}

/// Which analysis a parsed page goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisRoute {
    Vision,
    Text,
}

impl AnalysisRoute {
    /// Vision if the content carries a visual artifact, text otherwise.
    pub fn for_content(content: &ExtractedContent) -> Self {
        if content.image_payload().is_some() {
            AnalysisRoute::Vision
        } else {
            AnalysisRoute::Text
        }
    }

    pub fn state(self) -> WebpageState {
        match self {
            AnalysisRoute::Vision => WebpageState::AnalyzeViaVision,
            AnalysisRoute::Text => WebpageState::AnalyzeViaText,
        }
    }
}

/// A parsed page ready for analysis.
#[derive(Debug, Clone)]
pub struct WebpageExtraction {
    pub content: ExtractedContent,
    pub route: AnalysisRoute,

    /// Why a full render fell back to text analysis
    pub degraded_reason: Option<String>,

    /// States visited so far, ending with the analysis state
    pub trace: Vec<WebpageState>,
}

/// Runs the extraction half of the webpage state machine.
///
/// Browser renders share a semaphore sized by `render_concurrency`; fast
/// fetches are not limited. A render that times out still holds its permit
/// until the engine returns.
#[derive(Clone)]
pub struct WebpageExtractor {
    fetcher: Arc<dyn PageFetcher>,
    renderer: Arc<dyn PageRenderer>,
    render_permits: Arc<Semaphore>,
    fetch_timeout: Duration,
    render_timeout: Duration,
}

impl WebpageExtractor {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        renderer: Arc<dyn PageRenderer>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            fetcher,
            renderer,
            render_permits: Arc::new(Semaphore::new(config.render_permits())),
            fetch_timeout: config.fetch_timeout(),
            render_timeout: config.render_timeout(),
        }
    }

    /// Extract `url` along the path chosen by `mode`.
    pub async fn extract(&self, url: &str, mode: FetchMode) -> ExtractionResult<WebpageExtraction> {
        let started = Instant::now();
        let mut trace = vec![WebpageState::Start];

        let fetched = match mode {
            FetchMode::Fast => {
                trace.push(WebpageState::FastFetch);
                self.fast_fetch(url).await
            }
            FetchMode::Full => {
                trace.push(WebpageState::RenderedFetch);
                self.rendered_fetch(url).await
            }
        };

        let (content, degraded_reason) = match fetched {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(
                    url = %url,
                    mode = ?mode,
                    state = ?WebpageState::Failed,
                    error = %e,
                    "Webpage extraction failed"
                );
                return Err(e);
            }
        };
        trace.push(WebpageState::Parsed);

        let route = AnalysisRoute::for_content(&content);
        trace.push(route.state());

        info!(
            url = %url,
            mode = ?mode,
            route = ?route,
            has_title = content.title().is_some(),
            has_heading = content.heading().is_some(),
            has_paragraph = content.lead_paragraph().is_some(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Webpage parsed"
        );

        Ok(WebpageExtraction {
            content,
            route,
            degraded_reason,
            trace,
        })
    }

    async fn fast_fetch(&self, url: &str) -> ExtractionResult<(ExtractedContent, Option<String>)> {
        debug!(url = %url, fetcher = self.fetcher.name(), "Fast fetch");

        let page = tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(url))
            .await
            .map_err(|_| ExtractionError::Timeout {
                target: url.to_string(),
                after: self.fetch_timeout,
            })??;

        if !(200..300).contains(&page.status) {
            warn!(url = %url, status = page.status, "Non-success status, parsing body anyway");
        }

        let outline = parse_outline(&page.html);
        Ok((ExtractedContent::webpage(url, outline, None), None))
    }

    async fn rendered_fetch(
        &self,
        url: &str,
    ) -> ExtractionResult<(ExtractedContent, Option<String>)> {
        let permit = Arc::clone(&self.render_permits)
            .acquire_owned()
            .await
            .map_err(|_| ExtractionError::RenderFailed {
                url: url.to_string(),
                reason: "render pool closed".to_string(),
            })?;
        debug!(url = %url, renderer = self.renderer.name(), "Rendered fetch");

        // The permit travels with the task: a render that outlives its
        // deadline keeps its browser slot until it really finishes.
        let renderer = Arc::clone(&self.renderer);
        let target = url.to_string();
        let render = tokio::spawn(async move {
            let _permit = permit;
            renderer.render(&target).await
        });

        let page = match tokio::time::timeout(self.render_timeout, render).await {
            Err(_) => {
                return Err(ExtractionError::Timeout {
                    target: url.to_string(),
                    after: self.render_timeout,
                })
            }
            Ok(Ok(rendered)) => rendered?,
            Ok(Err(e)) => {
                warn!(url = %url, error = %e, "Render task failed");
                RenderedPage::unavailable(format!("render task failed: {}", e))
            }
        };

        let mut degraded_reason = page.degraded_reason;
        let screenshot = match page.screenshot {
            Some(png) if !png.is_empty() => Some(EncodedImage::encode(&png, "image/png")),
            Some(_) => {
                degraded_reason.get_or_insert_with(|| "empty screenshot".to_string());
                None
            }
            None => None,
        };

        if screenshot.is_none() {
            warn!(
                url = %url,
                reason = degraded_reason.as_deref().unwrap_or("no screenshot"),
                "No screenshot, degrading to text analysis"
            );
        }

        Ok((ExtractedContent::webpage(url, page.outline, screenshot), degraded_reason))
    }
}

impl std::fmt::Debug for WebpageExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebpageExtractor")
            .field("fetcher", &self.fetcher.name())
            .field("renderer", &self.renderer.name())
            .field("fetch_timeout", &self.fetch_timeout)
            .field("render_timeout", &self.render_timeout)
            .finish()
    }
}
