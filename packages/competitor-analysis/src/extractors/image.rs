//! Image encoding for multimodal analysis.

use tracing::debug;

use crate::error::{ExtractionError, ExtractionResult};
use crate::types::content::{EncodedImage, ExtractedContent};

/// MIME types the vision model accepts.
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Normalise a declared MIME type: lowercase, parameters dropped.
fn essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Check a MIME type against the allow-list, returning its normal form.
pub fn check_image_type(mime_type: &str) -> ExtractionResult<String> {
    let normalised = essence(mime_type);
    if ALLOWED_IMAGE_TYPES.contains(&normalised.as_str()) {
        Ok(normalised)
    } else {
        Err(ExtractionError::UnsupportedMediaType {
            mime_type: mime_type.to_string(),
            allowed: ALLOWED_IMAGE_TYPES.join(", "),
        })
    }
}

/// Encode image bytes as transport-safe content.
pub fn extract_image(bytes: &[u8], mime_type: &str) -> ExtractionResult<ExtractedContent> {
    let mime_type = check_image_type(mime_type)?;
    if bytes.is_empty() {
        return Err(ExtractionError::EmptyExtraction {
            what: "image upload".to_string(),
        });
    }

    let image = EncodedImage::encode(bytes, mime_type);
    debug!(
        mime_type = %image.mime_type,
        size_kb = image.byte_len / 1024,
        base64_chars = image.base64.len(),
        "Image encoded"
    );
    Ok(ExtractedContent::image(image))
}
