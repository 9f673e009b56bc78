//! Canonical extracted content, the hand-off between extractors and the
//! reasoning client.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use super::text::truncate_chars;

/// Cap on each webpage field (title, heading, lead paragraph).
pub const MAX_PAGE_FIELD_CHARS: usize = 500;

/// What kind of artifact the content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Text,
    Image,
    Pdf,
    Webpage,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Text => "text",
            SourceKind::Image => "image",
            SourceKind::Pdf => "pdf",
            SourceKind::Webpage => "webpage",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image bytes in transport-safe form (standard base64).
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct EncodedImage {
    pub mime_type: String,
    pub base64: String,
    /// Size of the original, undecoded bytes
    pub byte_len: usize,
}

impl EncodedImage {
    /// Base64-encode raw image bytes.
    pub fn encode(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            base64: STANDARD.encode(bytes),
            byte_len: bytes.len(),
        }
    }

    /// Decode back to raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.base64)
    }
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime_type", &self.mime_type)
            .field("byte_len", &self.byte_len)
            .finish()
    }
}

/// Title, first heading and lead paragraph recovered from page markup.
///
/// Every field is optional; a page without an `<h1>` still yields the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageOutline {
    pub title: Option<String>,
    pub heading: Option<String>,
    pub lead_paragraph: Option<String>,
}

impl PageOutline {
    /// True when nothing was recovered.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.heading.is_none() && self.lead_paragraph.is_none()
    }

    /// Apply the per-field character cap and drop blank fields.
    pub fn capped(self) -> Self {
        fn cap(field: Option<String>) -> Option<String> {
            field
                .map(|s| truncate_chars(s.trim(), MAX_PAGE_FIELD_CHARS).to_string())
                .filter(|s| !s.is_empty())
        }
        Self {
            title: cap(self.title),
            heading: cap(self.heading),
            lead_paragraph: cap(self.lead_paragraph),
        }
    }
}

/// The canonical intermediate representation of one artifact.
///
/// Constructors enforce the shape per kind: text and PDF carry only text,
/// image carries only an image, webpage carries the URL, an outline and
/// optionally a screenshot.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedContent {
    source_kind: SourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_text: Option<String>,
    #[serde(skip)]
    image: Option<EncodedImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(flatten)]
    outline: PageOutline,
    has_screenshot: bool,
}

impl ExtractedContent {
    /// Free text, passed through untouched.
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_text(SourceKind::Text, text.into())
    }

    /// Text recovered from a PDF.
    pub fn pdf(text: impl Into<String>) -> Self {
        Self::with_text(SourceKind::Pdf, text.into())
    }

    /// An encoded image.
    pub fn image(image: EncodedImage) -> Self {
        Self {
            source_kind: SourceKind::Image,
            raw_text: None,
            image: Some(image),
            url: None,
            outline: PageOutline::default(),
            has_screenshot: false,
        }
    }

    /// A webpage outline, with a screenshot when one was captured.
    pub fn webpage(
        url: impl Into<String>,
        outline: PageOutline,
        screenshot: Option<EncodedImage>,
    ) -> Self {
        Self {
            source_kind: SourceKind::Webpage,
            raw_text: None,
            has_screenshot: screenshot.is_some(),
            image: screenshot,
            url: Some(url.into()),
            outline: outline.capped(),
        }
    }

    fn with_text(kind: SourceKind, text: String) -> Self {
        Self {
            source_kind: kind,
            raw_text: Some(text),
            image: None,
            url: None,
            outline: PageOutline::default(),
            has_screenshot: false,
        }
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    pub fn raw_text(&self) -> Option<&str> {
        self.raw_text.as_deref()
    }

    pub fn image_payload(&self) -> Option<&EncodedImage> {
        self.image.as_ref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn outline(&self) -> &PageOutline {
        &self.outline
    }

    pub fn title(&self) -> Option<&str> {
        self.outline.title.as_deref()
    }

    pub fn heading(&self) -> Option<&str> {
        self.outline.heading.as_deref()
    }

    pub fn lead_paragraph(&self) -> Option<&str> {
        self.outline.lead_paragraph.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_kinds_carry_only_text() {
        let text = ExtractedContent::text("Great prices, slow delivery");
        assert_eq!(text.source_kind(), SourceKind::Text);
        assert_eq!(text.raw_text(), Some("Great prices, slow delivery"));
        assert!(text.image_payload().is_none());

        let pdf = ExtractedContent::pdf("page one");
        assert_eq!(pdf.source_kind(), SourceKind::Pdf);
        assert!(pdf.image_payload().is_none());
    }

    #[test]
    fn test_image_carries_only_image() {
        let content = ExtractedContent::image(EncodedImage::encode(b"\x89PNG", "image/png"));
        assert_eq!(content.source_kind(), SourceKind::Image);
        assert!(content.raw_text().is_none());
        assert_eq!(content.image_payload().unwrap().byte_len, 4);
    }

    #[test]
    fn test_webpage_fields_are_capped() {
        let outline = PageOutline {
            title: Some("Shop".into()),
            heading: Some("h".repeat(600)),
            lead_paragraph: Some("   ".into()),
        };
        let content = ExtractedContent::webpage("https://shop.example", outline, None);

        assert_eq!(content.title(), Some("Shop"));
        assert_eq!(content.heading().unwrap().chars().count(), MAX_PAGE_FIELD_CHARS);
        assert_eq!(content.lead_paragraph(), None);
        assert!(content.image_payload().is_none());
    }

    #[test]
    fn test_encoded_image_round_trip_and_redacted_debug() {
        let image = EncodedImage::encode(b"GIF89a", "image/gif");
        assert_eq!(image.base64, "R0lGODlh");
        assert_eq!(image.decode().unwrap(), b"GIF89a");
        assert!(!format!("{:?}", image).contains("R0lGODlh"));
    }

    #[test]
    fn test_serialized_webpage_omits_image_bytes() {
        let shot = EncodedImage::encode(b"png-bytes", "image/png");
        let content =
            ExtractedContent::webpage("https://a.example", PageOutline::default(), Some(shot));
        let json = serde_json::to_value(&content).unwrap();

        assert_eq!(json["source_kind"], "webpage");
        assert_eq!(json["has_screenshot"], true);
        assert!(json.get("image").is_none());
    }
}
