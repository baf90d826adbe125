//! Autodiag Core - Diagnostic Plan Generation
//!
//! This crate turns a structured vehicle fault report into a validated,
//! bilingual (English/Spanish) diagnostic procedure:
//! - Input: request payload parsing with defaults
//! - Plan: the typed diagnostic plan and its step graph
//! - Schema: output JSON schema and referential-integrity checks
//! - Extract: fence stripping and two-stage JSON extraction from model text
//! - Prompt: generation and repair instructions
//! - Handler: the generate / validate / repair-once state machine
//! - Response: the `{ ok, plan | error }` wire envelope

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod extract;
pub mod handler;
pub mod input;
pub mod plan;
pub mod prompt;
pub mod response;
pub mod schema;

pub use error::{Error, Result};
pub use extract::{extract_json, ExtractError, Extraction, ExtractionStage};
pub use handler::{
    AttemptFailure, Diagnosis, DiagnosisHandler, DiagnosisSettings, HandlerState,
    DEFAULT_TEMPERATURE, REPAIR_ATTEMPTS,
};
pub use input::{DiagnosticInput, Locale};
pub use plan::{
    BilingualList, BilingualText, ConnectorHint, DiagnosticPlan, EstimatedSpecs, FaultConcern,
    SpecItem, Step, VehicleSummary, PLAN_FORMAT_VERSION,
};
pub use response::DiagnosisResponse;
pub use schema::{plan_schema, validate_plan, ValidationIssue, MAX_REPORTED_ISSUES};
