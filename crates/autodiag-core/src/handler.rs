//! Diagnosis handler
//!
//! Runs one request through the pipeline:
//! credential check, input parsing, prompt, generation, extraction, validation.
//! A rejected first attempt gets exactly one repair attempt carrying the
//! validation issues; a second rejection is terminal.

use crate::error::{Error, Result};
use crate::extract::{extract_json, ExtractError, ExtractionStage};
use crate::input::DiagnosticInput;
use crate::plan::DiagnosticPlan;
use crate::prompt::{build_prompt, build_repair_prompt};
use crate::schema::{summarize_issues, validate_plan, ValidationIssue};
use autodiag_llm::gemini::DEFAULT_MODEL;
use autodiag_llm::util::mask_api_key;
use autodiag_llm::{CompletionRequest, LlmProvider, Message};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Repair attempts after the first generation
pub const REPAIR_ATTEMPTS: u32 = 1;

/// Sampling temperature for plan generation
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Handler settings, fixed at construction
#[derive(Clone)]
pub struct DiagnosisSettings {
    /// Provider credential; requests are refused while unset or empty
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Output token cap (provider default when `None`)
    pub max_tokens: Option<u32>,
}

impl fmt::Debug for DiagnosisSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosisSettings")
            .field("api_key", &self.api_key.as_deref().map(mask_api_key))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl Default for DiagnosisSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
        }
    }
}

impl DiagnosisSettings {
    /// Settings with a credential and defaults for everything else
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Set the model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the output token cap
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Whether a non-empty credential is present
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Request lifecycle, logged at each transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    /// Nothing done yet
    Idle,
    /// Credential and input accepted
    Validated,
    /// Generation attempt N returned text
    Generated(u32),
    /// First attempt rejected, repairing
    Retrying,
    /// Plan accepted
    Success,
    /// Every attempt rejected
    Failed,
}

impl fmt::Display for HandlerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Validated => f.write_str("validated"),
            Self::Generated(n) => write!(f, "generated_{}", n),
            Self::Retrying => f.write_str("retrying"),
            Self::Success => f.write_str("success"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// Why one attempt's output was rejected
#[derive(Debug, Clone)]
pub enum AttemptFailure {
    /// No JSON object could be extracted
    Parse(ExtractError),
    /// JSON extracted but failed validation
    Schema(Vec<ValidationIssue>),
}

impl AttemptFailure {
    /// Issues to feed back into the repair prompt
    #[must_use]
    pub fn issues(&self) -> Vec<ValidationIssue> {
        match self {
            Self::Parse(e) => vec![ValidationIssue::new("(root)", e.to_string())],
            Self::Schema(issues) => issues.clone(),
        }
    }
}

/// A successful diagnosis
#[derive(Debug, Clone)]
pub struct Diagnosis {
    /// The validated plan
    pub plan: DiagnosticPlan,
    /// Generation attempts used (1 or 2)
    pub attempts: u32,
    /// Extraction stage that produced the accepted JSON
    pub extraction: ExtractionStage,
}

/// Turns diagnostic requests into validated plans
pub struct DiagnosisHandler {
    settings: DiagnosisSettings,
    provider: Arc<dyn LlmProvider>,
}

impl DiagnosisHandler {
    /// Create a handler
    pub fn new(settings: DiagnosisSettings, provider: Arc<dyn LlmProvider>) -> Self {
        Self { settings, provider }
    }

    /// Settings this handler was built with
    #[must_use]
    pub fn settings(&self) -> &DiagnosisSettings {
        &self.settings
    }

    /// Name of the underlying provider
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.settings.has_credential() {
            Ok(())
        } else {
            Err(Error::Configuration(
                "Missing GEMINI_API_KEY environment variable".to_string(),
            ))
        }
    }

    /// Handle a raw JSON request body.
    ///
    /// The credential is checked before the body is even parsed.
    pub async fn handle_payload(&self, body: &[u8]) -> Result<Diagnosis> {
        self.ensure_configured()?;
        let input = DiagnosticInput::from_json_slice(body)?;
        self.diagnose(&input).await
    }

    /// Produce a plan for an already-parsed input
    #[instrument(
        skip(self, input),
        fields(
            session_id = %input.session_id,
            locale = %input.language,
            make = %input.make,
            model = %self.settings.model
        )
    )]
    pub async fn diagnose(&self, input: &DiagnosticInput) -> Result<Diagnosis> {
        let mut state = HandlerState::Idle;
        debug!(%state, "Diagnosis requested");

        self.ensure_configured()?;
        state = HandlerState::Validated;
        debug!(%state, dtcs = ?input.dtcs, "Input accepted");

        let base_prompt = build_prompt(input)?;
        let mut prompt = base_prompt.clone();
        let mut last_raw = String::new();
        let mut last_issues: Vec<ValidationIssue> = Vec::new();
        let max_attempts = REPAIR_ATTEMPTS + 1;

        for attempt in 1..=max_attempts {
            let raw = match self.generate(&prompt).await {
                Ok(raw) => raw,
                Err(e) => {
                    state = HandlerState::Failed;
                    error!(%state, attempt, error = %e.error_tag(), "Model call failed");
                    return Err(e);
                }
            };
            state = HandlerState::Generated(attempt);
            debug!(%state, bytes = raw.len(), "Model replied");

            match check_output(&raw, input) {
                Ok((plan, extraction)) => {
                    state = HandlerState::Success;
                    info!(
                        %state,
                        attempt,
                        %extraction,
                        steps = plan.steps.len(),
                        "Diagnostic plan accepted"
                    );
                    return Ok(Diagnosis {
                        plan,
                        attempts: attempt,
                        extraction,
                    });
                }
                Err(failure) => {
                    let issues = failure.issues();
                    warn!(
                        attempt,
                        issues = %summarize_issues(&issues),
                        "Model output rejected"
                    );
                    if attempt < max_attempts {
                        state = HandlerState::Retrying;
                        debug!(%state, "Requesting repair");
                        prompt = build_repair_prompt(&base_prompt, &issues);
                    }
                    last_raw = raw;
                    last_issues = issues;
                }
            }
        }

        state = HandlerState::Failed;
        error!(
            %state,
            attempts = max_attempts,
            issue_count = last_issues.len(),
            "Giving up on diagnostic plan"
        );
        Err(Error::PlanRejected {
            attempts: max_attempts,
            detail: summarize_issues(&last_issues),
            raw: last_raw,
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let mut request = CompletionRequest::new(&self.settings.model)
            .with_message(Message::user(prompt))
            .with_temperature(self.settings.temperature);
        if let Some(max_tokens) = self.settings.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        let response = self.provider.complete(request).await?;
        if let Some(usage) = &response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Token usage"
            );
        }
        Ok(response.content)
    }
}

fn check_output(
    raw: &str,
    input: &DiagnosticInput,
) -> std::result::Result<(DiagnosticPlan, ExtractionStage), AttemptFailure> {
    let extraction = extract_json(raw).map_err(AttemptFailure::Parse)?;
    let plan = validate_plan(&extraction.value, input).map_err(AttemptFailure::Schema)?;
    Ok((plan, extraction.stage))
}
