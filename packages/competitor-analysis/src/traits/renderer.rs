//! Renderer trait for the full (browser) webpage path.

use async_trait::async_trait;

use crate::error::ExtractionResult;
use crate::types::content::PageOutline;

/// Result of a browser render that reached the page.
///
/// A missing screenshot is a degradation, not a failure: the page is still
/// analysed from its outline.
#[derive(Debug, Clone, Default)]
pub struct RenderedPage {
    /// Title, heading and lead paragraph from the rendered DOM
    pub outline: PageOutline,

    /// PNG screenshot of the viewport
    pub screenshot: Option<Vec<u8>>,

    /// Why no screenshot was produced (engine unavailable, capture error)
    pub degraded_reason: Option<String>,
}

impl RenderedPage {
    /// A render with outline and screenshot.
    pub fn complete(outline: PageOutline, screenshot: Vec<u8>) -> Self {
        Self {
            outline,
            screenshot: Some(screenshot),
            degraded_reason: None,
        }
    }

    /// A render that produced no screenshot.
    pub fn without_screenshot(outline: PageOutline, reason: impl Into<String>) -> Self {
        Self {
            outline,
            screenshot: None,
            degraded_reason: Some(reason.into()),
        }
    }

    /// The engine could not run at all.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::without_screenshot(PageOutline::default(), reason)
    }
}

/// Loads a page in a rendering engine and captures a screenshot.
///
/// `Err` means the page itself could not be loaded and is fatal for the
/// invocation. An engine that cannot start must return
/// [`RenderedPage::unavailable`] instead.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> ExtractionResult<RenderedPage>;

    /// Short renderer name for logs.
    fn name(&self) -> &str;
}

/// Renderer used when no engine is compiled in or configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRenderer;

#[async_trait]
impl PageRenderer for NoRenderer {
    async fn render(&self, _url: &str) -> ExtractionResult<RenderedPage> {
        Ok(RenderedPage::unavailable("no rendering engine configured"))
    }

    fn name(&self) -> &str {
        "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_renderer_degrades() {
        let page = NoRenderer.render("https://example.com").await.unwrap();
        assert!(page.screenshot.is_none());
        assert!(page.outline.is_empty());
        assert!(page.degraded_reason.is_some());
    }
}
