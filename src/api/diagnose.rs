//! Diagnosis API endpoints
//!
//! POST /api/v1/diagnose        - generate a diagnostic plan
//! GET  /api/v1/diagnose/schema - output JSON schema

use super::error::ApiError;
use autodiag_core::{plan_schema, DiagnosisHandler, DiagnosisResponse};
use axum::{
    body::Bytes,
    extract::Extension,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

/// Generate a plan for the request body.
///
/// The body is taken raw so malformed JSON surfaces as the same
/// `{ ok: false }` envelope as every other failure.
async fn diagnose(
    Extension(handler): Extension<Arc<DiagnosisHandler>>,
    body: Bytes,
) -> Result<Json<DiagnosisResponse>, ApiError> {
    let diagnosis = handler.handle_payload(&body).await?;
    Ok(Json(DiagnosisResponse::success(diagnosis.plan)))
}

async fn schema() -> Json<serde_json::Value> {
    Json(plan_schema().clone())
}

/// Create diagnosis routes
pub fn diagnose_routes() -> Router {
    Router::new()
        .route("/api/v1/diagnose", post(diagnose))
        .route("/api/v1/diagnose/schema", get(schema))
}
