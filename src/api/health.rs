//! Health check endpoint
//!
//! `/health` reports the version and whether a provider credential is
//! configured. It never calls the provider.

use autodiag_core::DiagnosisHandler;
use axum::extract::Extension;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use std::sync::Arc;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub llm: LlmHealth,
}

/// Provider readiness
#[derive(Debug, Serialize)]
pub struct LlmHealth {
    pub configured: bool,
    pub model: String,
}

async fn health_check(
    Extension(handler): Extension<Arc<DiagnosisHandler>>,
) -> Json<HealthResponse> {
    let settings = handler.settings();
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        llm: LlmHealth {
            configured: settings.has_credential(),
            model: settings.model.clone(),
        },
    })
}

/// Create health routes
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_check))
}
