use anyhow::{Context, Result};
use autodiag_core::DiagnosisResponse;
use std::io::Read;

fn read_input(input: &str) -> Result<Vec<u8>> {
    if input == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read request from stdin")?;
        Ok(buf)
    } else {
        std::fs::read(input).with_context(|| format!("Failed to read request file {}", input))
    }
}

/// Run one diagnosis and print the response envelope
pub async fn run(input: &str) -> Result<()> {
    let body = read_input(input)?;
    let config = crate::server::load_config()?;
    let handler = crate::server::build_handler(&config)?;

    let (status, response) = DiagnosisResponse::from_result(handler.handle_payload(&body).await);
    tracing::debug!(status, ok = response.ok, "Diagnosis finished");

    let rendered =
        serde_json::to_string_pretty(&response).context("Failed to serialize response")?;
    println!("{}", rendered);

    if !response.ok {
        std::process::exit(1);
    }
    Ok(())
}
