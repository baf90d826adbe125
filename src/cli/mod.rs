//! CLI module for Autodiag
//!
//! - `serve`: run the HTTP server (default)
//! - `diagnose`: run one diagnosis from a JSON file or stdin
//! - `schema`: print the diagnostic plan JSON schema

use anyhow::Context;
use clap::{Parser, Subcommand};

pub mod diagnose;

/// Autodiag CLI
#[derive(Parser, Debug)]
#[command(name = "autodiag")]
#[command(about = "Bilingual automotive diagnostic plan generator")]
#[command(version)]
pub struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server (default)
    Serve,
    /// Diagnose a single request
    Diagnose {
        /// Request JSON file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
    },
    /// Print the diagnostic plan JSON schema
    Schema,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Diagnose { input }) => diagnose::run(&input).await,
        Some(Commands::Schema) => {
            let schema = serde_json::to_string_pretty(autodiag_core::plan_schema())
                .context("Failed to serialize schema")?;
            println!("{}", schema);
            Ok(())
        }
        Some(Commands::Serve) | None => {
            let config = crate::server::load_config()?;
            crate::server::run(config).await
        }
    }
}
