//! Pipeline orchestrator: extraction, analysis and ledger recording for each
//! artifact kind.
//!
//! Validation and extraction errors stop an invocation before the reasoning
//! service is called. Only completed analyses reach the ledger; a failed or
//! cancelled invocation leaves it untouched.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::reasoning::ReasoningClient;
use super::webpage::{AnalysisRoute, FetchMode, WebpageExtractor, WebpageState};
use crate::error::{
    AnalysisError, ExtractionError, PipelineError, PipelineResult, ValidationError,
};
use crate::extractors::http::HttpFetcher;
use crate::extractors::image::extract_image;
use crate::extractors::pdf::PdfExtractor;
use crate::extractors::text::extract_text;
use crate::security::UrlGuard;
use crate::stores::HistoryLedger;
use crate::traits::fetcher::PageFetcher;
use crate::traits::reasoning::ReasoningService;
use crate::traits::renderer::{NoRenderer, PageRenderer};
use crate::types::analysis::{AnalysisResult, Assessment, ImageAnalysis, TextAnalysis};
use crate::types::config::PipelineConfig;
use crate::types::content::{ExtractedContent, SourceKind};
use crate::types::history::{HistoryEntry, REQUEST_SUMMARY_CHARS};
use crate::types::text::{truncate_chars, ELLIPSIS};

/// Response summary recorded for an image whose description came back empty.
pub const IMAGE_PLACEHOLDER_SUMMARY: &str = "Image analysed";

/// One user-supplied competitor input.
#[derive(Debug, Clone)]
pub enum Artifact {
    Text(String),
    Image {
        bytes: Vec<u8>,
        mime_type: String,
        filename: Option<String>,
    },
    Pdf {
        bytes: Vec<u8>,
        filename: Option<String>,
    },
    Url {
        url: String,
        mode: FetchMode,
    },
}

impl Artifact {
    pub fn kind(&self) -> SourceKind {
        match self {
            Artifact::Text(_) => SourceKind::Text,
            Artifact::Image { .. } => SourceKind::Image,
            Artifact::Pdf { .. } => SourceKind::Pdf,
            Artifact::Url { .. } => SourceKind::Webpage,
        }
    }
}

/// PDF analysis with a preview of the extracted text.
#[derive(Debug, Clone, Serialize)]
pub struct PdfAnalysis {
    pub preview: String,
    pub analysis: TextAnalysis,
}

/// Webpage analysis with the content it was based on.
#[derive(Debug, Clone, Serialize)]
pub struct WebpageAnalysis {
    pub content: ExtractedContent,
    pub analysis: AnalysisResult,
    pub route: AnalysisRoute,
    pub degraded_reason: Option<String>,
    pub trace: Vec<WebpageState>,
}

/// Result of one invocation, by artifact kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "result", rename_all = "lowercase")]
pub enum PipelineOutput {
    Text(TextAnalysis),
    Image(ImageAnalysis),
    Pdf(PdfAnalysis),
    Webpage(WebpageAnalysis),
}

/// A running invocation that can be awaited or cancelled.
#[derive(Debug)]
pub struct InvocationHandle {
    token: CancellationToken,
    task: JoinHandle<PipelineResult<PipelineOutput>>,
}

impl InvocationHandle {
    /// Abandon the invocation. In-flight calls are dropped and nothing is
    /// recorded.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Token that cancels this invocation when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Wait for the outcome.
    pub async fn join(self) -> PipelineResult<PipelineOutput> {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(PipelineError::Cancelled),
        }
    }
}

/// Composes extractors, the reasoning client and the history ledger.
///
/// Cheap to clone; clones share the ledger and the render pool.
///
/// # Example
///
/// ```rust,ignore
/// use competitor_analysis::{Pipeline, testing::MockReasoningService};
///
/// let pipeline = Pipeline::builder(Arc::new(MockReasoningService::new())).build()?;
/// let analysis = pipeline.analyze_text("Great prices, slow delivery, no live chat support.").await?;
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    reasoning: ReasoningClient,
    webpages: WebpageExtractor,
    pdf: PdfExtractor,
    guard: UrlGuard,
    ledger: Arc<HistoryLedger>,
}

impl Pipeline {
    /// Start building a pipeline around a reasoning service.
    pub fn builder(service: Arc<dyn ReasoningService>) -> PipelineBuilder {
        PipelineBuilder::new(service)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<HistoryLedger> {
        &self.ledger
    }

    /// Analyse free text of at least `min_text_chars` characters.
    pub async fn analyze_text(&self, text: &str) -> PipelineResult<TextAnalysis> {
        let started = Instant::now();
        let len = text.chars().count();
        if len < self.config.min_text_chars {
            return Err(ValidationError::InputTooShort {
                len,
                min: self.config.min_text_chars,
            }
            .into());
        }

        let content = extract_text(text)?;
        let analysis = expect_text(self.reasoning.analyze(&content).await?)?;

        self.record(HistoryEntry::new(SourceKind::Text, text, &analysis.summary));
        info!(
            kind = ?SourceKind::Text,
            chars = len,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Text analysed"
        );
        Ok(analysis)
    }

    /// Analyse an uploaded image.
    pub async fn analyze_image(
        &self,
        bytes: &[u8],
        mime_type: &str,
        filename: Option<&str>,
    ) -> PipelineResult<ImageAnalysis> {
        let started = Instant::now();
        let content = extract_image(bytes, mime_type)?;
        let analysis = expect_image(self.reasoning.analyze(&content).await?)?;

        let request = match filename {
            Some(name) if !name.trim().is_empty() => format!("Image: {}", name),
            _ => format!("Image ({})", mime_type),
        };
        let response = if analysis.description.trim().is_empty() {
            IMAGE_PLACEHOLDER_SUMMARY
        } else {
            analysis.description.as_str()
        };
        self.record(HistoryEntry::new(SourceKind::Image, &request, response));

        info!(
            kind = ?SourceKind::Image,
            size_kb = bytes.len() / 1024,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Image analysed"
        );
        Ok(analysis)
    }

    /// Extract text from a PDF and analyse it.
    pub async fn analyze_pdf(
        &self,
        bytes: Vec<u8>,
        filename: Option<&str>,
    ) -> PipelineResult<PdfAnalysis> {
        let started = Instant::now();
        let size_kb = bytes.len() / 1024;
        let content = self.extract_pdf(bytes).await?;
        let text = content.raw_text().unwrap_or_default();
        let preview = preview(text, self.config.pdf_preview_chars);

        let analysis = expect_text(self.reasoning.analyze(&content).await?)?;

        let request = match filename {
            Some(name) if !name.trim().is_empty() => format!("PDF: {}", name),
            _ => "PDF document".to_string(),
        };
        let response = if analysis.summary.trim().is_empty() {
            format!("Text: {}", truncate_chars(text, REQUEST_SUMMARY_CHARS))
        } else {
            analysis.summary.clone()
        };
        self.record(HistoryEntry::new(SourceKind::Pdf, &request, &response));

        info!(
            kind = ?SourceKind::Pdf,
            size_kb,
            text_chars = text.chars().count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "PDF analysed"
        );
        Ok(PdfAnalysis { preview, analysis })
    }

    /// Extract and analyse a live webpage.
    pub async fn analyze_url(&self, url: &str, mode: FetchMode) -> PipelineResult<WebpageAnalysis> {
        let started = Instant::now();
        let url = self.guard.check(url)?.to_string();

        let extraction = self.webpages.extract(&url, mode).await?;
        let analysis = self.reasoning.analyze(&extraction.content).await?;

        let response = if analysis.summary().trim().is_empty() {
            format!("Title: {}", extraction.content.title().unwrap_or("N/A"))
        } else {
            analysis.summary().to_string()
        };
        self.record(HistoryEntry::new(
            SourceKind::Webpage,
            &format!("URL: {}", url),
            &response,
        ));

        let mut trace = extraction.trace;
        trace.push(WebpageState::Done);
        info!(
            kind = ?SourceKind::Webpage,
            url = %url,
            mode = ?mode,
            route = ?extraction.route,
            degraded = extraction.degraded_reason.is_some(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Webpage analysed"
        );

        Ok(WebpageAnalysis {
            content: extraction.content,
            analysis,
            route: extraction.route,
            degraded_reason: extraction.degraded_reason,
            trace,
        })
    }

    /// Recent invocations, most recent first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.ledger.list()
    }

    /// Forget every recorded invocation.
    pub fn clear_history(&self) {
        self.ledger.clear();
        info!("History cleared");
    }

    /// Run one artifact to completion.
    pub async fn run(&self, artifact: Artifact) -> PipelineResult<PipelineOutput> {
        match artifact {
            Artifact::Text(text) => self.analyze_text(&text).await.map(PipelineOutput::Text),
            Artifact::Image {
                bytes,
                mime_type,
                filename,
            } => self
                .analyze_image(&bytes, &mime_type, filename.as_deref())
                .await
                .map(PipelineOutput::Image),
            Artifact::Pdf { bytes, filename } => self
                .analyze_pdf(bytes, filename.as_deref())
                .await
                .map(PipelineOutput::Pdf),
            Artifact::Url { url, mode } => self
                .analyze_url(&url, mode)
                .await
                .map(PipelineOutput::Webpage),
        }
    }

    /// Run `artifact` until it finishes or `token` is cancelled.
    pub async fn run_until_cancelled(
        &self,
        artifact: Artifact,
        token: CancellationToken,
    ) -> PipelineResult<PipelineOutput> {
        let kind = artifact.kind();
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                warn!(kind = ?kind, "Invocation cancelled");
                Err(PipelineError::Cancelled)
            }
            outcome = self.run(artifact) => outcome,
        }
    }

    /// Start an invocation in the background.
    pub fn spawn(&self, artifact: Artifact) -> InvocationHandle {
        let token = CancellationToken::new();
        let pipeline = self.clone();
        let child = token.clone();
        debug!(kind = ?artifact.kind(), "Spawning invocation");
        let task = tokio::spawn(async move { pipeline.run_until_cancelled(artifact, child).await });
        InvocationHandle { token, task }
    }

    fn record(&self, entry: HistoryEntry) {
        debug!(id = %entry.id(), kind = ?entry.kind(), "Recording history entry");
        self.ledger.append(entry);
    }

    async fn extract_pdf(&self, bytes: Vec<u8>) -> PipelineResult<ExtractedContent> {
        let extractor = self.pdf.clone();
        let deadline = self.config.pdf_timeout();
        let task = tokio::task::spawn_blocking(move || extractor.extract(&bytes));

        let joined = tokio::time::timeout(deadline, task)
            .await
            .map_err(|_| ExtractionError::Timeout {
                target: "PDF document".to_string(),
                after: deadline,
            })?;
        let content = joined
            .map_err(|e| ExtractionError::PdfDecode(format!("decoder task failed: {}", e)))??;
        Ok(content)
    }
}

fn expect_text(result: AnalysisResult) -> Result<TextAnalysis, AnalysisError> {
    match result {
        AnalysisResult::Text(analysis) => Ok(analysis),
        AnalysisResult::Image(_) => Err(AnalysisError::MalformedResponse(
            "expected a text analysis, got an image analysis".to_string(),
        )),
    }
}

fn expect_image(result: AnalysisResult) -> Result<ImageAnalysis, AnalysisError> {
    match result {
        AnalysisResult::Image(analysis) => Ok(analysis),
        AnalysisResult::Text(_) => Err(AnalysisError::MalformedResponse(
            "expected an image analysis, got a text analysis".to_string(),
        )),
    }
}

/// First `max_chars` characters of `text`, with `...` appended when cut.
fn preview(text: &str, max_chars: usize) -> String {
    let head = truncate_chars(text, max_chars);
    if head.len() < text.len() {
        format!("{}{}", head, ELLIPSIS)
    } else {
        head.to_string()
    }
}

/// Assembles a [`Pipeline`].
///
/// Defaults: [`HttpFetcher`] for the fast path, [`NoRenderer`] for the full
/// path (every full render degrades to text analysis), a fresh ledger holding
/// the ten most recent entries.
pub struct PipelineBuilder {
    service: Arc<dyn ReasoningService>,
    config: PipelineConfig,
    fetcher: Option<Arc<dyn PageFetcher>>,
    renderer: Option<Arc<dyn PageRenderer>>,
    ledger: Option<Arc<HistoryLedger>>,
}

impl PipelineBuilder {
    fn new(service: Arc<dyn ReasoningService>) -> Self {
        Self {
            service,
            config: PipelineConfig::default(),
            fetcher: None,
            renderer: None,
            ledger: None,
        }
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Share an existing ledger instead of creating one.
    pub fn ledger(mut self, ledger: Arc<HistoryLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn build(self) -> PipelineResult<Pipeline> {
        let config = self.config;
        let guard = UrlGuard::new().allow_private_hosts(config.allow_private_hosts);

        let fetcher: Arc<dyn PageFetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new(
                config.fetch_timeout(),
                &config.user_agent,
                guard.clone(),
            )?),
        };
        let renderer = self.renderer.unwrap_or_else(|| Arc::new(NoRenderer));

        let pipeline = Pipeline {
            reasoning: ReasoningClient::new(self.service, &config),
            webpages: WebpageExtractor::new(fetcher, renderer, &config),
            pdf: PdfExtractor::new(config.pdf_max_chars),
            guard,
            ledger: self
                .ledger
                .unwrap_or_else(|| Arc::new(HistoryLedger::new())),
            config: Arc::new(config),
        };

        info!(
            text_model = %pipeline.config.text_model,
            vision_model = %pipeline.config.vision_model,
            render_concurrency = pipeline.config.render_permits(),
            history_capacity = pipeline.ledger.capacity(),
            "Pipeline ready"
        );
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockFetcher, MockReasoningService};

    fn pipeline(mock: MockReasoningService) -> Pipeline {
        Pipeline::builder(Arc::new(mock))
            .fetcher(Arc::new(MockFetcher::with_html("<title>Shop</title>")))
            .build()
            .unwrap()
    }

    #[test]
    fn test_preview_marks_cut() {
        assert_eq!(preview("short", 500), "short");
        let long = "x".repeat(600);
        let cut = preview(&long, 500);
        assert_eq!(cut.chars().count(), 503);
        assert!(cut.ends_with("..."));
    }

    #[tokio::test]
    async fn test_short_text_never_reaches_service() {
        let mock = MockReasoningService::new();
        let err = pipeline(mock.clone()).analyze_text("too short").await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Validation(ValidationError::InputTooShort { len: 9, min: 10 })
        ));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_image_history_uses_filename_or_mime() {
        let p = pipeline(MockReasoningService::new());
        p.analyze_image(b"png", "image/png", Some("banner.png")).await.unwrap();
        p.analyze_image(b"gif", "image/gif", None).await.unwrap();

        let history = p.history();
        assert_eq!(history[0].request_summary(), "Image (image/gif)");
        assert_eq!(history[1].request_summary(), "Image: banner.png");
        assert_eq!(history[1].kind(), SourceKind::Image);
    }

    #[tokio::test]
    async fn test_unsupported_image_type_skips_service() {
        let mock = MockReasoningService::new();
        let p = pipeline(mock.clone());
        let err = p.analyze_image(b"bmp", "image/bmp", None).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Extraction(ExtractionError::UnsupportedMediaType { .. })
        ));
        assert_eq!(mock.call_count(), 0);
        assert!(p.history().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_url_rejected_before_fetch() {
        let fetcher = MockFetcher::with_html("<title>x</title>");
        let counter = fetcher.clone();
        let p = Pipeline::builder(Arc::new(MockReasoningService::new()))
            .fetcher(Arc::new(fetcher))
            .build()
            .unwrap();

        let err = p.analyze_url("http://169.254.169.254/", FetchMode::Fast).await.unwrap_err();
        assert!(matches!(err, PipelineError::Validation(ValidationError::InvalidUrl { .. })));
        assert_eq!(counter.fetch_count(), 0);
    }

    #[test]
    fn test_built_ledger_holds_ten() {
        let p = pipeline(MockReasoningService::new());
        assert_eq!(p.ledger().capacity(), 10);
    }

    #[tokio::test]
    async fn test_webpage_history_falls_back_to_title() {
        let mock = MockReasoningService::new().with_text_reply(
            r#"{"strengths":[],"weaknesses":[],"unique_offers":[],"recommendations":[],
                "summary":"","design_score":0,"technology_potential":0}"#,
        );
        let p = pipeline(mock);
        let result = p.analyze_url("https://shop.example", FetchMode::Fast).await.unwrap();

        assert_eq!(result.trace.last(), Some(&WebpageState::Done));
        let entry = &p.history()[0];
        assert_eq!(entry.request_summary(), "URL: https://shop.example/");
        assert_eq!(entry.response_summary(), "Title: Shop");
    }

    #[tokio::test]
    async fn test_spawned_invocation_joins() {
        let p = pipeline(MockReasoningService::new());
        let handle = p.spawn(Artifact::Text("Great prices, slow delivery".into()));

        match handle.join().await.unwrap() {
            PipelineOutput::Text(analysis) => assert!(!analysis.summary.is_empty()),
            other => panic!("unexpected output {:?}", other),
        }
        assert_eq!(p.history().len(), 1);
    }
}
