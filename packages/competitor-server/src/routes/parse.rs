use axum::{extract::Extension, Json};
use competitor_analysis::{AnalysisResult, AnalysisRoute, FetchMode, WebpageAnalysis};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub url: String,
}

#[derive(Serialize)]
pub struct ParsedContent {
    url: String,
    title: Option<String>,
    h1: Option<String>,
    first_paragraph: Option<String>,
    analysis: AnalysisResult,
    route: AnalysisRoute,
    #[serde(skip_serializing_if = "Option::is_none")]
    degraded_reason: Option<String>,
}

#[derive(Serialize)]
pub struct ParseResponse {
    success: bool,
    data: ParsedContent,
    error: Option<String>,
}

impl From<WebpageAnalysis> for ParseResponse {
    fn from(result: WebpageAnalysis) -> Self {
        let content = &result.content;
        let data = ParsedContent {
            url: content.url().unwrap_or_default().to_string(),
            title: content.title().map(str::to_string),
            h1: content.heading().map(str::to_string),
            first_paragraph: content.lead_paragraph().map(str::to_string),
            analysis: result.analysis,
            route: result.route,
            degraded_reason: result.degraded_reason,
        };
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

async fn parse(state: AppState, url: &str, mode: FetchMode) -> Result<Json<ParseResponse>, ApiError> {
    info!(url = %url, mode = ?mode, "Webpage analysis requested");
    let result = state.pipeline.analyze_url(url, mode).await?;
    Ok(Json(result.into()))
}

/// Plain HTTP fetch, text analysis of the outline.
pub async fn parse_fast_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<ParseRequest>,
) -> Result<Json<ParseResponse>, ApiError> {
    parse(state, &request.url, FetchMode::Fast).await
}

/// Browser render, vision analysis when a screenshot is captured.
pub async fn parse_demo_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<ParseRequest>,
) -> Result<Json<ParseResponse>, ApiError> {
    parse(state, &request.url, FetchMode::Full).await
}
