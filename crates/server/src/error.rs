use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dompet_ocr::{PipelineError, UnsupportedMediaType};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self { detail: detail.into() }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    UnsupportedMediaType(#[from] UnsupportedMediaType),
    #[error("No file provided")]
    MissingFile,
    #[error("Malformed upload: {0}")]
    Upload(String),
    #[error(transparent)]
    Scan(#[from] PipelineError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::UnsupportedMediaType(e) => {
                tracing::debug!("rejected upload: {e}");
                (StatusCode::BAD_REQUEST, "File must be an image (JPG/PNG)".to_string())
            }
            ApiError::MissingFile => (
                StatusCode::BAD_REQUEST,
                "No file provided. Use field name 'file'".to_string(),
            ),
            ApiError::Upload(msg) => {
                tracing::warn!("failed to read upload: {msg}");
                (StatusCode::BAD_REQUEST, "Failed to read upload".to_string())
            }
            ApiError::Scan(e) => {
                // The diagnostic stays in the logs.
                tracing::error!(decode_failure = e.is_decode_failure(), "receipt scan failed: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to process image".to_string())
            }
        };
        (status, Json(ErrorResponse::new(detail))).into_response()
    }
}
