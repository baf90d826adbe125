//! Autodiag - Bilingual Automotive Diagnostic Plans
//!
//! CLI entry point for the Autodiag server.

#![forbid(unsafe_code)]

use anyhow::Result;
use autodiag::cli;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = cli::Cli::parse();

    let json_logs = cli.json
        || std::env::var("AUTODIAG_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "autodiag=info,tower_http=info".into());

    // Logs go to stderr so `diagnose` / `schema` output stays clean JSON
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    info!("Starting Autodiag v{}", env!("CARGO_PKG_VERSION"));

    cli::run(cli).await
}
