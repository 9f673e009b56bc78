//! Headless Chrome renderer for the full webpage path.

use std::fmt::Display;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions};
use tracing::{debug, info, warn};

use super::markup::parse_outline;
use crate::error::{ExtractionError, ExtractionResult};
use crate::traits::renderer::{PageRenderer, RenderedPage};
use crate::types::content::PageOutline;

/// Renders pages in a shared headless Chrome instance.
///
/// The browser is launched on first use and reused afterwards. A launch
/// failure is reported as an unavailable engine, so callers fall back to
/// text-only analysis.
#[derive(Clone)]
pub struct ChromeRenderer {
    chrome_path: Option<PathBuf>,
    navigation_timeout: Duration,
    window_size: (u32, u32),
    browser: Arc<Mutex<Option<Browser>>>,
}

impl std::fmt::Debug for ChromeRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromeRenderer")
            .field("chrome_path", &self.chrome_path)
            .field("navigation_timeout", &self.navigation_timeout)
            .field("window_size", &self.window_size)
            .finish()
    }
}

impl Default for ChromeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChromeRenderer {
    pub fn new() -> Self {
        Self {
            chrome_path: None,
            navigation_timeout: Duration::from_secs(30),
            window_size: (1920, 1080),
            browser: Arc::new(Mutex::new(None)),
        }
    }

    /// Use a specific Chrome/Chromium binary instead of auto-detection.
    pub fn with_chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    /// Return the cached browser, launching it if needed.
    fn browser(&self) -> Result<Browser, String> {
        let mut slot = self.browser.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(browser) = slot.as_ref() {
            return Ok(browser.clone());
        }

        let options = LaunchOptions {
            headless: true,
            sandbox: false,
            path: self.chrome_path.clone(),
            window_size: Some(self.window_size),
            ..Default::default()
        };
        let browser = Browser::new(options).map_err(|e| e.to_string())?;
        info!(chrome_path = ?self.chrome_path, "Headless browser launched");
        *slot = Some(browser.clone());
        Ok(browser)
    }

    /// Drop the cached browser so the next render relaunches it.
    fn reset(&self) {
        let mut slot = self.browser.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }

    fn render_blocking(&self, url: &str) -> ExtractionResult<RenderedPage> {
        let browser = match self.browser() {
            Ok(browser) => browser,
            Err(reason) => {
                warn!(error = %reason, "Browser unavailable, continuing without screenshot");
                return Ok(RenderedPage::unavailable(format!(
                    "browser unavailable: {}",
                    reason
                )));
            }
        };

        let tab = match browser.new_tab() {
            Ok(tab) => tab,
            Err(e) => {
                // The cached process may have died; relaunch next time
                self.reset();
                warn!(error = %e, "Could not open browser tab");
                return Ok(RenderedPage::unavailable(format!("browser tab failed: {}", e)));
            }
        };
        let closer = Arc::clone(&tab);
        let _close = CloseOnDrop::new(move || {
            if let Err(e) = closer.close(false) {
                debug!(error = %e, "Tab close failed");
            }
        });
        tab.set_default_timeout(self.navigation_timeout);

        let load_failed = |e: &dyn Display| ExtractionError::FetchFailed {
            url: url.to_string(),
            reason: e.to_string(),
        };
        tab.navigate_to(url).map_err(|e| load_failed(&e))?;
        tab.wait_until_navigated().map_err(|e| load_failed(&e))?;

        Ok(assemble_page(url, tab.get_content(), || {
            tab.capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
        }))
    }
}

/// Build the result of a render that reached the page.
///
/// Losing the DOM or the screenshot after navigation degrades the render
/// rather than failing it.
fn assemble_page<E, F>(
    url: &str,
    html: Result<String, E>,
    capture: impl FnOnce() -> Result<Vec<u8>, F>,
) -> RenderedPage
where
    E: Display,
    F: Display,
{
    let html = match html {
        Ok(html) => html,
        Err(e) => {
            warn!(url = %url, error = %e, "Rendered content unavailable, continuing without it");
            return RenderedPage::without_screenshot(
                PageOutline::default(),
                format!("page content unavailable: {}", e),
            );
        }
    };
    let outline = parse_outline(&html);
    debug!(url = %url, html_chars = html.len(), "Rendered DOM parsed");

    match capture() {
        Ok(png) => {
            info!(url = %url, size_kb = png.len() / 1024, "Screenshot captured");
            RenderedPage::complete(outline, png)
        }
        Err(e) => {
            warn!(url = %url, error = %e, "Screenshot failed, continuing without it");
            RenderedPage::without_screenshot(outline, format!("screenshot failed: {}", e))
        }
    }
}

/// Runs a cleanup closure when dropped, whichever way the scope is left.
struct CloseOnDrop<F: FnOnce()> {
    close: Option<F>,
}

impl<F: FnOnce()> CloseOnDrop<F> {
    fn new(close: F) -> Self {
        Self { close: Some(close) }
    }
}

impl<F: FnOnce()> Drop for CloseOnDrop<F> {
    fn drop(&mut self) {
        if let Some(close) = self.close.take() {
            close();
        }
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn render(&self, url: &str) -> ExtractionResult<RenderedPage> {
        let renderer = self.clone();
        let target = url.to_string();
        match tokio::task::spawn_blocking(move || renderer.render_blocking(&target)).await {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!(url = %url, error = %e, "Render task aborted");
                Ok(RenderedPage::unavailable(format!("render task aborted: {}", e)))
            }
        }
    }

    fn name(&self) -> &str {
        "chrome"
    }
}
