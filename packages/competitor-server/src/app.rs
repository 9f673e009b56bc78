//! Application setup and router.

use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use competitor_analysis::Pipeline;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes::{
    analyze_image_handler, analyze_pdf_handler, analyze_text_handler, clear_history_handler,
    health_handler, history_handler, parse_demo_handler, parse_fast_handler,
};

/// Uploads above this size are rejected before reaching a handler.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }
}

/// Build the router around a ready pipeline.
pub fn build_app(state: AppState) -> Router {
    // CORS configuration - allow any origin, the frontend runs separately
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/analyze_text", post(analyze_text_handler))
        .route("/analyze_image", post(analyze_image_handler))
        .route("/analyze_pdf", post(analyze_pdf_handler))
        .route("/parse_fast", post(parse_fast_handler))
        .route("/parse_demo", post(parse_demo_handler))
        .route("/history", get(history_handler).delete(clear_history_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
