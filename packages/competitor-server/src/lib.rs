//! HTTP API for the competitor analysis pipeline.

pub mod app;
pub mod config;
pub mod error;
pub mod routes;

pub use app::{build_app, AppState};
pub use config::Config;
pub use error::ApiError;
