//! Server initialization
//!
//! Builds the diagnosis handler from configuration, assembles the router and
//! runs the HTTP server until Ctrl+C / SIGTERM.

use super::config::AppConfig;
use crate::api::{diagnose_routes, health_routes};
use anyhow::{Context, Result};
use autodiag_core::DiagnosisHandler;
use autodiag_llm::GeminiProvider;
use axum::{extract::Extension, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Build the diagnosis handler backed by the Gemini provider.
///
/// A missing credential is not a startup failure: the handler answers every
/// diagnosis request with a configuration error instead.
pub fn build_handler(config: &AppConfig) -> Result<DiagnosisHandler> {
    let api_key = config.llm.resolve_api_key();
    if api_key.is_none() {
        warn!("No Gemini API key configured; diagnosis requests will fail until one is set");
    }
    if !autodiag_llm::gemini::MODELS.contains(&config.llm.model.as_str()) {
        warn!(model = %config.llm.model, "Model is not in the known Gemini model list");
    }

    let provider = GeminiProvider::new(config.llm.gemini_config(api_key.clone()))
        .context("Failed to create Gemini provider")?;

    Ok(DiagnosisHandler::new(
        config.llm.diagnosis_settings(api_key),
        Arc::new(provider),
    ))
}

/// Assemble the HTTP router around a handler
pub fn build_router(handler: Arc<DiagnosisHandler>) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(diagnose_routes())
        .layer(Extension(handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Run the server
pub async fn run(config: AppConfig) -> Result<()> {
    let handler = Arc::new(build_handler(&config)?);
    info!(
        provider = handler.provider_name(),
        model = %handler.settings().model,
        "Diagnosis handler ready"
    );

    let app = build_router(handler);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    info!("HTTP server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Autodiag shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}
