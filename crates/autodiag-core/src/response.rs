//! Response envelope
//!
//! Success: `{ "ok": true, "plan": ... }`.
//! Failure: `{ "ok": false, "error": ..., "detail"?: ..., "raw"?: ... }`.

use crate::error::{Error, Result};
use crate::handler::Diagnosis;
use crate::plan::DiagnosticPlan;
use serde::{Deserialize, Serialize};

/// Wire envelope for a diagnosis outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisResponse {
    /// Whether a plan was produced
    pub ok: bool,
    /// The plan, on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<DiagnosticPlan>,
    /// Error tag, on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Issue summary, when the model output was rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Last raw model text, when the model output was rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl DiagnosisResponse {
    /// Success envelope
    #[must_use]
    pub fn success(plan: DiagnosticPlan) -> Self {
        Self {
            ok: true,
            plan: Some(plan),
            error: None,
            detail: None,
            raw: None,
        }
    }

    /// Failure envelope for an error
    #[must_use]
    pub fn failure(error: &Error) -> Self {
        let (detail, raw) = match error {
            Error::PlanRejected { detail, raw, .. } => (Some(detail.clone()), Some(raw.clone())),
            _ => (None, None),
        };
        Self {
            ok: false,
            plan: None,
            error: Some(error.error_tag()),
            detail,
            raw,
        }
    }

    /// HTTP status and envelope for a handler outcome
    #[must_use]
    pub fn from_result(result: Result<Diagnosis>) -> (u16, Self) {
        match result {
            Ok(diagnosis) => (200, Self::success(diagnosis.plan)),
            Err(e) => (e.status_code(), Self::failure(&e)),
        }
    }
}
