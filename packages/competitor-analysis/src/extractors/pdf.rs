//! PDF text extraction.
//!
//! Decoding is CPU-bound and synchronous; the pipeline runs it on the
//! blocking pool under a deadline.

use std::panic;

use tracing::{debug, info};

use crate::error::{ExtractionError, ExtractionResult};
use crate::types::content::ExtractedContent;
use crate::types::text::truncate_chars;

/// Separator between the text of consecutive pages.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Default cap on the combined text, in characters.
pub const DEFAULT_MAX_CHARS: usize = 5000;

/// Extracts page text from PDF bytes.
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    max_chars: usize,
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHARS)
    }
}

impl PdfExtractor {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Decode, combine and cap the text of every page.
    pub fn extract(&self, bytes: &[u8]) -> ExtractionResult<ExtractedContent> {
        let pages = decode_pages(bytes)?;
        info!(pages = pages.len(), size_kb = bytes.len() / 1024, "PDF decoded");
        let text = combine_pages(pages, self.max_chars)?;
        Ok(ExtractedContent::pdf(text))
    }
}

/// Decode a PDF into the text of each page, in page order.
pub fn decode_pages(bytes: &[u8]) -> ExtractionResult<Vec<String>> {
    if bytes.is_empty() {
        return Err(ExtractionError::PdfDecode("empty document".to_string()));
    }

    // The decoder can panic on malformed streams
    panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
        .map_err(|_| ExtractionError::PdfDecode("decoder panicked on malformed input".into()))?
        .map_err(|e| ExtractionError::PdfDecode(e.to_string()))
}

/// Join non-blank pages with a blank line and cap the result.
///
/// Pages with no text are skipped. Fails with `EmptyExtraction` if nothing
/// but whitespace remains.
pub fn combine_pages(
    pages: impl IntoIterator<Item = String>,
    max_chars: usize,
) -> ExtractionResult<String> {
    let mut kept = Vec::new();
    let mut skipped = 0usize;
    for (index, page) in pages.into_iter().enumerate() {
        let trimmed = page.trim();
        if trimmed.is_empty() {
            skipped += 1;
            continue;
        }
        debug!(page = index + 1, chars = trimmed.chars().count(), "PDF page text");
        kept.push(trimmed.to_string());
    }

    let combined = kept.join(PAGE_SEPARATOR);
    let total_chars = combined.chars().count();
    let text = if total_chars > max_chars {
        info!(from = total_chars, to = max_chars, "PDF text truncated");
        truncate_chars(&combined, max_chars).to_string()
    } else {
        combined
    };

    if text.trim().is_empty() {
        return Err(ExtractionError::EmptyExtraction {
            what: format!("PDF ({} blank pages)", skipped),
        });
    }

    debug!(non_empty_pages = kept.len(), skipped, "PDF pages combined");
    Ok(text)
}
