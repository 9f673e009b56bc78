//! Fetcher trait for the fast (plain HTTP) webpage path.

use async_trait::async_trait;

use crate::error::ExtractionResult;

/// Markup returned by a plain fetch.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status: u16,

    /// Response body as text
    pub html: String,
}

impl FetchedPage {
    pub fn new(final_url: impl Into<String>, status: u16, html: impl Into<String>) -> Self {
        Self {
            final_url: final_url.into(),
            status,
            html: html.into(),
        }
    }
}

/// Fetches raw markup for a URL.
///
/// Errors are `ExtractionError::Timeout` or `ExtractionError::FetchFailed`.
/// The caller applies its own overall deadline as well.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> ExtractionResult<FetchedPage>;

    /// Short fetcher name for logs.
    fn name(&self) -> &str;
}
