use axum::extract::{Multipart, State};
use axum::Json;
use dompet_core::Rupiah;
use dompet_ocr::ImageKind;
use serde::Serialize;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub ocr_backend: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub status: &'static str,
    pub data: ScanData,
}

/// Prefill for a new transaction. The date is left to the client.
#[derive(Debug, Serialize)]
pub struct ScanData {
    pub merchant: String,
    pub amount: Rupiah,
    /// Merchant or amount fell back to a default; ask the user to confirm.
    pub needs_review: bool,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Welcome to the Dompet API",
        status: "Running",
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        ocr_backend: state.pipeline.backend_name(),
    })
}

/// `POST /api/v1/ocr/scan` with a multipart `file` field (JPEG or PNG).
pub async fn scan_receipt(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ScanResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Upload(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        // Checked before reading the body so rejected uploads never reach the pipeline.
        let kind = ImageKind::from_mime(field.content_type().unwrap_or(""))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::Upload(e.to_string()))?;
        tracing::debug!(%kind, bytes = data.len(), "received receipt upload");

        let scanned = state.pipeline.scan(data.to_vec()).await?;
        let receipt = scanned.receipt;
        let needs_review = receipt.needs_review();

        return Ok(Json(ScanResponse {
            status: "success",
            data: ScanData {
                merchant: receipt.merchant,
                amount: receipt.amount,
                needs_review,
            },
        }));
    }

    Err(ApiError::MissingFile)
}
