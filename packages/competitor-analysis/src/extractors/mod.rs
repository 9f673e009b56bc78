//! Input-specific extractors that turn raw artifacts into [`ExtractedContent`].
//!
//! [`ExtractedContent`]: crate::types::content::ExtractedContent

#[cfg(feature = "browser")]
pub mod browser;
pub mod http;
pub mod image;
pub mod markup;
pub mod pdf;
pub mod text;

#[cfg(feature = "browser")]
pub use browser::ChromeRenderer;
pub use http::HttpFetcher;
pub use image::{check_image_type, extract_image, ALLOWED_IMAGE_TYPES};
pub use markup::parse_outline;
pub use pdf::PdfExtractor;
pub use text::extract_text;
