//! Gemini provider implementation

use super::config::GeminiConfig;
use super::convert::{candidate_text, convert_messages};
use super::security::classify_api_error;
use super::types::*;
use crate::completion::{CompletionRequest, CompletionResponse, TokenUsage};
use crate::error::{Error, Result};
use crate::provider::LlmProvider;
use reqwest::Client;
use tracing::{debug, instrument, warn};

/// Google Gemini provider
pub struct GeminiProvider {
    client: Client,
    pub(crate) config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.without_url().to_string()))?;

        Ok(Self { client, config })
    }

    /// Send a single request to the Gemini API.
    ///
    /// No retry happens here: callers own their retry policy.
    pub(crate) async fn send_request(
        &self,
        model: &str,
        request: &GeminiRequest,
    ) -> Result<GeminiResponse> {
        // SECURITY: Don't log the full URL (contains API key)
        debug!("Sending request to Gemini model: {}", model);

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url, model, self.config.api_key
        );

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(self.config.timeout.as_millis() as u64)
                } else {
                    Error::Network(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.without_url().to_string()))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<GeminiError>(&body).ok().map(|e| e.error);
            warn!(
                status = %status,
                upstream_status = detail.as_ref().map(|d| d.status.as_str()).unwrap_or(""),
                "Gemini API error response"
            );
            return Err(classify_api_error(status.as_u16(), detail.as_ref()));
        }

        serde_json::from_str(&body).map_err(|e| {
            Error::InvalidResponse(format!(
                "{}: {}",
                e,
                crate::util::truncate_safe(&body, 200)
            ))
        })
    }

    /// Build the wire request for a completion
    pub(crate) fn build_request(&self, request: &CompletionRequest) -> GeminiRequest {
        let (system_instruction, contents) = convert_messages(&request.messages);
        GeminiRequest {
            contents,
            system_instruction,
            generation_config: Some(GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens.or(Some(self.config.default_max_tokens)),
            }),
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let model = if request.model.is_empty() {
            self.config.default_model.clone()
        } else {
            request.model.clone()
        };

        let gemini_request = self.build_request(&request);
        let response = self.send_request(&model, &gemini_request).await?;

        let finish_reason = response
            .candidates
            .first()
            .and_then(|c| c.finish_reason.clone());
        let content = candidate_text(&response)
            .ok_or_else(|| Error::InvalidResponse("No candidates in response".to_string()))?;

        if content.is_empty() && finish_reason.as_deref() == Some("MAX_TOKENS") {
            warn!("Gemini response empty (MAX_TOKENS)");
        }

        let usage = response.usage_metadata.map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count.unwrap_or(0),
            total_tokens: u.total_token_count,
        });

        Ok(CompletionResponse {
            content,
            usage,
            finish_reason,
            model,
        })
    }
}
