//! Testing utilities including mock implementations.
//!
//! These let applications exercise the pipeline without calling a real
//! reasoning service, network or browser.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AnalysisError, AnalysisOutcome, ExtractionError, ExtractionResult};
use crate::traits::fetcher::{FetchedPage, PageFetcher};
use crate::traits::reasoning::{ReasoningRequest, ReasoningService};
use crate::traits::renderer::{PageRenderer, RenderedPage};
use crate::types::content::PageOutline;

/// A valid text-analysis reply for the "great prices, slow delivery" scenario.
pub fn sample_text_reply() -> String {
    r#"{
  "strengths": ["Great prices"],
  "weaknesses": ["Slow delivery", "No live chat support"],
  "unique_offers": ["Lowest prices in the segment"],
  "recommendations": ["Advertise fast delivery", "Add live chat to the site"],
  "summary": "Competes on price but loses customers on delivery speed and support.",
  "design_score": 6,
  "technology_potential": 4
}"#
    .to_string()
}

/// A valid image-analysis reply.
pub fn sample_image_reply() -> String {
    r#"{
  "description": "Landing page with a large discount banner and product grid.",
  "marketing_insights": ["Aggressive discount messaging", "Clear call to action"],
  "visual_style_score": 7,
  "visual_style_analysis": "Bold colours, consistent typography, busy above the fold.",
  "recommendations": ["Use calmer hero imagery"],
  "design_score": 7,
  "technology_potential": 5
}"#
    .to_string()
}

/// A mock reasoning service.
///
/// Answers text requests with one canned reply and multimodal requests with
/// another, optionally after a delay or with a transport failure. Every
/// request is recorded for assertions.
#[derive(Clone)]
pub struct MockReasoningService {
    text_reply: String,
    image_reply: String,
    failure: Option<String>,
    delay: Option<Duration>,
    calls: Arc<RwLock<Vec<ReasoningRequest>>>,
}

impl Default for MockReasoningService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockReasoningService {
    /// Create a mock answering with [`sample_text_reply`] and [`sample_image_reply`].
    pub fn new() -> Self {
        Self {
            text_reply: sample_text_reply(),
            image_reply: sample_image_reply(),
            failure: None,
            delay: None,
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Raw reply for text-only requests.
    pub fn with_text_reply(mut self, reply: impl Into<String>) -> Self {
        self.text_reply = reply.into();
        self
    }

    /// Raw reply for multimodal requests.
    pub fn with_image_reply(mut self, reply: impl Into<String>) -> Self {
        self.image_reply = reply.into();
        self
    }

    /// Fail every call with an upstream failure carrying `reason`.
    pub fn with_failure(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    /// Wait before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get all requests received so far.
    pub fn calls(&self) -> Vec<ReasoningRequest> {
        self.calls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl ReasoningService for MockReasoningService {
    async fn complete(&self, request: &ReasoningRequest) -> AnalysisOutcome<String> {
        self.calls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(reason) = &self.failure {
            return Err(AnalysisError::upstream(reason.clone()));
        }

        Ok(if request.is_multimodal() {
            self.image_reply.clone()
        } else {
            self.text_reply.clone()
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A mock page fetcher returning the same markup for every URL.
#[derive(Clone)]
pub struct MockFetcher {
    html: String,
    status: u16,
    failure: Option<String>,
    delay: Option<Duration>,
    fetches: Arc<AtomicUsize>,
}

impl MockFetcher {
    /// Answer every fetch with `html` and status 200.
    pub fn with_html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            status: 200,
            failure: None,
            delay: None,
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail every fetch with `ExtractionError::FetchFailed`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::with_html("")
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Wait before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> ExtractionResult<FetchedPage> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.failure {
            Some(reason) => Err(ExtractionError::FetchFailed {
                url: url.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(FetchedPage::new(url, self.status, self.html.clone())),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[derive(Clone)]
enum RenderBehavior {
    Render(RenderedPage),
    Fail(String),
}

/// A mock browser renderer.
///
/// Tracks how many renders overlap so tests can check the concurrency limit.
#[derive(Clone)]
pub struct MockRenderer {
    behavior: RenderBehavior,
    delay: Option<Duration>,
    renders: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockRenderer {
    fn from_behavior(behavior: RenderBehavior) -> Self {
        Self {
            behavior,
            delay: None,
            renders: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Render succeeds with a screenshot.
    pub fn with_screenshot(outline: PageOutline, png: Vec<u8>) -> Self {
        Self::from_behavior(RenderBehavior::Render(RenderedPage::complete(outline, png)))
    }

    /// Render reaches the page but the screenshot fails.
    pub fn without_screenshot(outline: PageOutline, reason: impl Into<String>) -> Self {
        Self::from_behavior(RenderBehavior::Render(RenderedPage::without_screenshot(
            outline, reason,
        )))
    }

    /// The engine cannot start.
    pub fn unavailable() -> Self {
        Self::from_behavior(RenderBehavior::Render(RenderedPage::unavailable(
            "mock engine unavailable",
        )))
    }

    /// The page cannot be loaded; fails with `ExtractionError::FetchFailed`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::from_behavior(RenderBehavior::Fail(reason.into()))
    }

    /// Wait before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    /// Highest number of renders observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight counter even if the render future is dropped.
struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PageRenderer for MockRenderer {
    async fn render(&self, url: &str) -> ExtractionResult<RenderedPage> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(Arc::clone(&self.in_flight));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            RenderBehavior::Render(page) => Ok(page.clone()),
            RenderBehavior::Fail(reason) => Err(ExtractionError::FetchFailed {
                url: url.to_string(),
                reason: reason.clone(),
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::analysis::{ImageAnalysisReply, TextAnalysisReply};

    #[test]
    fn test_sample_replies_decode() {
        let text: TextAnalysisReply = serde_json::from_str(&sample_text_reply()).unwrap();
        assert_eq!(text.weaknesses.len(), 2);
        let image: ImageAnalysisReply = serde_json::from_str(&sample_image_reply()).unwrap();
        assert_eq!(image.visual_style_score, 7);
    }

    #[tokio::test]
    async fn test_mock_fetcher_counts() {
        let fetcher = MockFetcher::with_html("<p>hi</p>").with_status(404);
        let page = fetcher.fetch("https://a.example").await.unwrap();
        assert_eq!(page.status, 404);
        assert_eq!(fetcher.fetch_count(), 1);
    }
}

/// Build a minimal PDF with one page per entry, each showing its text in
/// Helvetica. A blank entry produces a page with an empty content stream.
pub fn sample_pdf(pages: &[&str]) -> Vec<u8> {
    let first_page = 4;
    let mut objects: Vec<String> = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            (0..pages.len())
                .map(|i| format!("{} 0 R", first_page + 2 * i))
                .collect::<Vec<_>>()
                .join(" "),
            pages.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    for (i, text) in pages.iter().enumerate() {
        let stream = if text.trim().is_empty() {
            String::new()
        } else {
            let escaped = text
                .replace('\\', "\\\\")
                .replace('(', "\\(")
                .replace(')', "\\)");
            format!("BT /F1 24 Tf 72 700 Td ({}) Tj ET", escaped)
        };
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            first_page + 2 * i + 1
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ));
    }

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_at = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{:010} 00000 n \n", offset));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    ));
    pdf.extend_from_slice(xref.as_bytes());
    pdf
}
