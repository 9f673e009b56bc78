use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use competitor_analysis::{AnalysisError, ExtractionError, PipelineError};
use serde::Serialize;
use tracing::{error, warn};

/// An error rendered as `{success: false, error}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unsupported_media(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, message)
    }
}

/// HTTP status for a pipeline failure.
pub fn status_for(err: &PipelineError) -> StatusCode {
    match err {
        PipelineError::Validation(_) => StatusCode::BAD_REQUEST,
        PipelineError::Extraction(ExtractionError::UnsupportedMediaType { .. }) => {
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        }
        PipelineError::Extraction(ExtractionError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
        PipelineError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineError::Analysis(AnalysisError::UpstreamFailure(_))
        | PipelineError::Analysis(AnalysisError::MalformedResponse(_)) => StatusCode::BAD_GATEWAY,
        PipelineError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self::new(status_for(&err), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), error = %self.message, "Request failed");
        } else {
            warn!(status = self.status.as_u16(), error = %self.message, "Request rejected");
        }

        let body = ErrorBody {
            success: false,
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
