//! Plain HTTP fetcher for the fast webpage path.

use std::error::Error as _;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::redirect;
use tracing::{debug, info, warn};

use crate::error::{ExtractionError, ExtractionResult};
use crate::security::UrlGuard;
use crate::traits::fetcher::{FetchedPage, PageFetcher};

/// Redirect hops followed before giving up.
pub const MAX_REDIRECTS: usize = 5;

/// Fetches a page with one GET, following redirects, without running scripts.
///
/// Callers check the starting URL; every redirect target is checked here
/// with the same guard.
///
/// # Example
///
/// ```rust,ignore
/// use competitor_analysis::extractors::HttpFetcher;
/// use competitor_analysis::security::UrlGuard;
///
/// let fetcher = HttpFetcher::new(Duration::from_secs(15), "CompetitorMonitor/1.0", UrlGuard::new())?;
/// let page = fetcher.fetch("https://example.com").await?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration, user_agent: &str, guard: UrlGuard) -> ExtractionResult<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.7,ru;q=0.5"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(guarded_redirects(guard))
            .build()
            .map_err(|e| ExtractionError::FetchFailed {
                url: String::new(),
                reason: format!("could not build HTTP client: {}", e),
            })?;

        Ok(Self { client, timeout })
    }

    fn map_error(&self, url: &str, e: reqwest::Error) -> ExtractionError {
        if e.is_timeout() {
            ExtractionError::Timeout {
                target: url.to_string(),
                after: self.timeout,
            }
        } else if e.is_redirect() {
            let reason = e
                .source()
                .map(|cause| cause.to_string())
                .unwrap_or_else(|| e.to_string());
            ExtractionError::FetchFailed {
                url: url.to_string(),
                reason: format!("redirect refused: {}", reason),
            }
        } else {
            ExtractionError::FetchFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

/// Follow at most [`MAX_REDIRECTS`] hops, each of which must pass `guard`.
fn guarded_redirects(guard: UrlGuard) -> redirect::Policy {
    redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            return attempt.error(format!("more than {} redirects", MAX_REDIRECTS));
        }
        match guard.check(attempt.url().as_str()) {
            Ok(_) => attempt.follow(),
            Err(e) => {
                warn!(target_url = %attempt.url(), error = %e, "Redirect blocked");
                attempt.error(e)
            }
        }
    })
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> ExtractionResult<FetchedPage> {
        debug!(url = %url, "HTTP fetch starting");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "HTTP request failed");
            self.map_error(url, e)
        })?;

        let status = response.status();
        let final_url = response.url().to_string();
        if !status.is_success() {
            // Error pages often still carry a usable title
            warn!(url = %url, status = %status, "Unusual HTTP status, parsing anyway");
        }

        let html = response.text().await.map_err(|e| self.map_error(url, e))?;

        info!(
            url = %url,
            final_url = %final_url,
            status = status.as_u16(),
            chars = html.len(),
            "Page fetched"
        );

        Ok(FetchedPage::new(final_url, status.as_u16(), html))
    }

    fn name(&self) -> &str {
        "http"
    }
}
