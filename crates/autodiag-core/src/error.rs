//! Error types for autodiag-core
//!
//! Every error knows the HTTP status it surfaces as and the `error` string
//! placed in the failure envelope, so transports don't re-derive either.

use thiserror::Error;

/// Fixed `error` value reported when both generation attempts were rejected
pub const PLAN_REJECTED_ERROR: &str = "Model output failed schema validation";

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Required credential missing
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Request payload failed the input schema
    #[error("invalid request: {0}")]
    InputValidation(String),

    /// Every generation attempt failed parsing or validation
    #[error("model output rejected after {attempts} attempts: {detail}")]
    PlanRejected {
        /// Number of generation attempts made
        attempts: u32,
        /// First issues as `path: message` pairs joined by `"; "`
        detail: String,
        /// Raw text of the last attempt
        raw: String,
    },

    /// LLM provider error
    #[error("llm error: {0}")]
    Llm(#[from] autodiag_llm::Error),

    /// Internal error (serialization, etc.)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// HTTP status code this error surfaces as
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Configuration(_) | Self::PlanRejected { .. } => 500,
            Self::InputValidation(_) | Self::Llm(_) | Self::Internal(_) => 400,
        }
    }

    /// Value of the `error` field in the failure envelope
    #[must_use]
    pub fn error_tag(&self) -> String {
        match self {
            Self::Configuration(msg) => msg.clone(),
            Self::PlanRejected { .. } => PLAN_REJECTED_ERROR.to_string(),
            Self::Llm(e) => autodiag_llm::util::sanitize_error_for_user(&e.to_string()),
            other => other.to_string(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
