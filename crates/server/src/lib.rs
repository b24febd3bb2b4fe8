//! HTTP boundary for receipt scanning.

pub mod config;
pub mod error;
pub mod routes;
pub mod telemetry;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use dompet_ocr::ReceiptPipeline;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use config::{ConfigError, ServerConfig};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: ReceiptPipeline,
}

impl AppState {
    pub fn new(pipeline: ReceiptPipeline) -> Self {
        Self { pipeline }
    }
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer, ConfigError> {
    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o).map_err(|_| ConfigError::InvalidOrigin(o.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any))
}

/// Build the router with all layers applied.
pub fn app(state: AppState, config: &ServerConfig) -> Result<Router, ConfigError> {
    let cors = cors_layer(&config.cors_origins)?;

    Ok(Router::new()
        .route("/", get(routes::root))
        .route("/api/health", get(routes::health))
        .route("/api/v1/ocr/scan", post(routes::scan_receipt))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_rejects_invalid_origin() {
        let err = cors_layer(&["http://ok.test".to_string(), "bad\norigin".to_string()]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOrigin(ref o) if o == "bad\norigin"));
    }

    #[test]
    fn cors_accepts_configured_origins() {
        assert!(cors_layer(&ServerConfig::default().cors_origins).is_ok());
    }
}
