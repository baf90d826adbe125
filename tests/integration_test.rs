//! End-to-end tests for the Autodiag HTTP surface
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`; the
//! Gemini provider is replaced by the scripted `MockProvider`.

use autodiag::server::build_router;
use autodiag_core::error::PLAN_REJECTED_ERROR;
use autodiag_core::{DiagnosisHandler, DiagnosisSettings};
use autodiag_llm::MockProvider;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const VALID_PLAN: &str = include_str!("../crates/autodiag-core/tests/fixtures/valid_plan.json");

fn request_body() -> Value {
    json!({
        "make": "Honda",
        "model": "Civic",
        "year": "2015",
        "engine": "1.8L",
        "dtcs": ["P0420"],
        "symptom": "Check engine light on",
        "notes": "",
        "language": "en"
    })
}

fn app(settings: DiagnosisSettings, provider: &MockProvider) -> axum::Router {
    build_router(Arc::new(DiagnosisHandler::new(
        settings,
        Arc::new(provider.clone()),
    )))
}

fn configured_app(provider: &MockProvider) -> axum::Router {
    app(DiagnosisSettings::with_api_key("test-key-1234567890"), provider)
}

async fn post_diagnose(app: axum::Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/diagnose")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    send(app, request).await
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ============================================================================
// Diagnose
// ============================================================================

#[tokio::test]
async fn test_valid_plan_on_first_attempt() {
    let provider = MockProvider::with_texts([VALID_PLAN]);

    let (status, body) =
        post_diagnose(configured_app(&provider), request_body().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["plan"]["firstStepId"], json!("step-1"));
    assert!(body["plan"]["steps"].as_array().unwrap().len() >= 5);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_prose_then_valid_plan() {
    let provider = MockProvider::with_texts([
        "Start by checking the oxygen sensors, then inspect the catalytic converter.",
        VALID_PLAN,
    ]);

    let (status, body) =
        post_diagnose(configured_app(&provider), request_body().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn test_missing_first_step_id_twice() {
    let mut plan: Value = serde_json::from_str(VALID_PLAN).unwrap();
    plan.as_object_mut().unwrap().remove("firstStepId");
    let first = plan.to_string();
    let second = serde_json::to_string_pretty(&plan).unwrap();
    let provider = MockProvider::with_texts([first, second.clone()]);

    let (status, body) =
        post_diagnose(configured_app(&provider), request_body().to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["error"], json!(PLAN_REJECTED_ERROR));
    assert!(body["detail"].as_str().unwrap().contains("firstStepId"));
    assert_eq!(body["raw"], json!(second));
    assert!(body.get("plan").is_none());
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn test_missing_credential() {
    let provider = MockProvider::with_texts([VALID_PLAN]);

    let (status, body) = post_diagnose(
        app(DiagnosisSettings::default(), &provider),
        request_body().to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("GEMINI_API_KEY"));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_malformed_request() {
    let provider = MockProvider::new();
    let mut request = request_body();
    request["dtcs"] = json!("P0420");

    let (status, body) = post_diagnose(configured_app(&provider), request.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], json!(false));
    assert!(body["error"].is_string());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_non_json_request() {
    let provider = MockProvider::new();

    let (status, body) = post_diagnose(configured_app(&provider), "make=Honda").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], json!(false));
}

// ============================================================================
// Health & schema
// ============================================================================

#[tokio::test]
async fn test_health() {
    let provider = MockProvider::new();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = send(configured_app(&provider), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["llm"]["configured"], json!(true));
    assert_eq!(body["llm"]["model"], json!("gemini-2.5-flash"));
}

#[tokio::test]
async fn test_health_reports_missing_credential() {
    let provider = MockProvider::new();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (_, body) = send(app(DiagnosisSettings::default(), &provider), request).await;

    assert_eq!(body["llm"]["configured"], json!(false));
}

#[tokio::test]
async fn test_schema_endpoint() {
    let provider = MockProvider::new();
    let request = Request::builder()
        .uri("/api/v1/diagnose/schema")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(configured_app(&provider), request).await;

    assert_eq!(status, StatusCode::OK);
    let required = body["required"].as_array().unwrap();
    assert!(required.contains(&json!("firstStepId")));
    assert!(required.contains(&json!("steps")));
}
