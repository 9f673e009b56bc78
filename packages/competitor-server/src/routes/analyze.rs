use axum::{
    extract::{Extension, Multipart},
    Json,
};
use competitor_analysis::{ImageAnalysis, TextAnalysis};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;

const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Deserialize)]
pub struct TextAnalysisRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct TextAnalysisResponse {
    success: bool,
    analysis: TextAnalysis,
    error: Option<String>,
}

#[derive(Serialize)]
pub struct ImageAnalysisResponse {
    success: bool,
    analysis: ImageAnalysis,
    error: Option<String>,
}

#[derive(Serialize)]
pub struct PdfAnalysisResponse {
    success: bool,
    extracted_text: String,
    analysis: TextAnalysis,
    error: Option<String>,
}

/// An uploaded `file` field.
struct Upload {
    bytes: Vec<u8>,
    content_type: String,
    filename: Option<String>,
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let filename = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Could not read upload: {}", e)))?;
        return Ok(Upload {
            bytes: bytes.to_vec(),
            content_type,
            filename,
        });
    }
    Err(ApiError::bad_request("Missing 'file' field"))
}

pub async fn analyze_text_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<TextAnalysisRequest>,
) -> Result<Json<TextAnalysisResponse>, ApiError> {
    info!(chars = request.text.chars().count(), "Text analysis requested");
    let analysis = state.pipeline.analyze_text(&request.text).await?;
    Ok(Json(TextAnalysisResponse {
        success: true,
        analysis,
        error: None,
    }))
}

pub async fn analyze_image_handler(
    Extension(state): Extension<AppState>,
    multipart: Multipart,
) -> Result<Json<ImageAnalysisResponse>, ApiError> {
    let upload = read_upload(multipart).await?;
    info!(
        content_type = %upload.content_type,
        size_kb = upload.bytes.len() / 1024,
        "Image analysis requested"
    );

    let analysis = state
        .pipeline
        .analyze_image(&upload.bytes, &upload.content_type, upload.filename.as_deref())
        .await?;
    Ok(Json(ImageAnalysisResponse {
        success: true,
        analysis,
        error: None,
    }))
}

pub async fn analyze_pdf_handler(
    Extension(state): Extension<AppState>,
    multipart: Multipart,
) -> Result<Json<PdfAnalysisResponse>, ApiError> {
    let upload = read_upload(multipart).await?;
    if !upload.content_type.eq_ignore_ascii_case(PDF_MIME) {
        return Err(ApiError::unsupported_media(format!(
            "Expected {}, got {}",
            PDF_MIME, upload.content_type
        )));
    }
    info!(size_kb = upload.bytes.len() / 1024, "PDF analysis requested");

    let result = state
        .pipeline
        .analyze_pdf(upload.bytes, upload.filename.as_deref())
        .await?;
    Ok(Json(PdfAnalysisResponse {
        success: true,
        extracted_text: result.preview,
        analysis: result.analysis,
        error: None,
    }))
}
