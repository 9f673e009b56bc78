//! Input safety checks applied before network access.

pub mod url;

pub use url::UrlGuard;
