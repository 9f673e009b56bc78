//! Free-text passthrough.

use tracing::debug;

use crate::error::{ExtractionError, ExtractionResult};
use crate::types::content::ExtractedContent;

/// Wrap competitor text as extracted content without transforming it.
///
/// Length checks belong to the caller; only whitespace-only input is
/// refused here, since there is nothing to analyse.
pub fn extract_text(input: &str) -> ExtractionResult<ExtractedContent> {
    if input.trim().is_empty() {
        return Err(ExtractionError::EmptyExtraction {
            what: "text input".to_string(),
        });
    }
    debug!(chars = input.chars().count(), "Text passthrough");
    Ok(ExtractedContent::text(input))
}
