use axum::{extract::Extension, Json};
use competitor_analysis::HistoryEntry;
use serde::Serialize;

use crate::app::AppState;

#[derive(Serialize)]
pub struct HistoryResponse {
    items: Vec<HistoryEntry>,
    total: usize,
}

#[derive(Serialize)]
pub struct ClearHistoryResponse {
    success: bool,
    message: String,
}

/// Recent invocations, most recent first
pub async fn history_handler(Extension(state): Extension<AppState>) -> Json<HistoryResponse> {
    let items = state.pipeline.history();
    Json(HistoryResponse {
        total: items.len(),
        items,
    })
}

pub async fn clear_history_handler(
    Extension(state): Extension<AppState>,
) -> Json<ClearHistoryResponse> {
    state.pipeline.clear_history();
    Json(ClearHistoryResponse {
        success: true,
        message: "History cleared".to_string(),
    })
}
