//! Output schema and plan validation
//!
//! Validation runs in two passes:
//! 1. JSON Schema (`jsonschema`) over the raw value: keys, types, enums,
//!    bilingual completeness, at least five steps.
//! 2. Referential integrity over the typed plan: `firstStepId` and every
//!    `nextOnPass` / `nextOnFail` resolve to a step and step ids are unique.
//!
//! Both passes report `(path, message)` issues. Steps unreachable from
//! `firstStepId` and a `sessionId` that does not echo the request are logged
//! but not rejected.

use crate::input::DiagnosticInput;
use crate::plan::{DiagnosticPlan, PLAN_FORMAT_VERSION};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;
use tracing::warn;

/// Issues beyond this count are dropped from repair prompts and failure details
pub const MAX_REPORTED_ISSUES: usize = 8;

/// Minimum number of steps a plan must contain
pub const MIN_STEPS: usize = 5;

/// A single validation problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Dotted path into the plan (`steps.0.id`), `(root)` for the top level
    pub path: String,
    /// What is wrong
    pub message: String,
}

impl ValidationIssue {
    /// Create an issue
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// First [`MAX_REPORTED_ISSUES`] issues as `path: message`, joined by `"; "`
#[must_use]
pub fn summarize_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .take(MAX_REPORTED_ISSUES)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn bilingual_text() -> Value {
    json!({
        "type": "object",
        "required": ["en", "es"],
        "properties": {
            "en": { "type": "string", "minLength": 1 },
            "es": { "type": "string", "minLength": 1 }
        }
    })
}

fn bilingual_list() -> Value {
    json!({
        "type": "object",
        "required": ["en", "es"],
        "properties": {
            "en": { "type": "array", "items": { "type": "string" } },
            "es": { "type": "array", "items": { "type": "string" } }
        }
    })
}

fn string_list() -> Value {
    json!({ "type": "array", "items": { "type": "string" } })
}

fn nullable_step_ref() -> Value {
    json!({ "type": ["string", "null"] })
}

static PLAN_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    let connector_hint = json!({
        "type": "object",
        "required": ["label", "test", "expected", "estimated", "notes"],
        "properties": {
            "label": bilingual_text(),
            "test": bilingual_text(),
            "expected": { "type": "string" },
            "estimated": { "type": "boolean" },
            "notes": bilingual_text()
        }
    });

    let step = json!({
        "type": "object",
        "required": [
            "id", "title", "purpose", "procedure", "connectorHints",
            "passCriteria", "failCriteria", "nextOnPass", "nextOnFail"
        ],
        "properties": {
            "id": { "type": "string", "minLength": 1 },
            "title": bilingual_text(),
            "purpose": bilingual_text(),
            "procedure": bilingual_list(),
            "connectorHints": { "type": "array", "items": connector_hint },
            "passCriteria": bilingual_list(),
            "failCriteria": bilingual_list(),
            "nextOnPass": nullable_step_ref(),
            "nextOnFail": nullable_step_ref()
        }
    });

    let spec_item = json!({
        "type": "object",
        "required": ["name", "range", "unit", "note"],
        "properties": {
            "name": bilingual_text(),
            "range": { "type": "string" },
            "unit": { "type": "string" },
            "note": bilingual_text()
        }
    });

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "DiagnosticPlan",
        "type": "object",
        "required": [
            "version", "locale", "sessionId", "vin", "mileage", "vehicle", "concern",
            "overview", "safetyNotes", "estimatedSpecs", "firstStepId", "steps", "disclaimer"
        ],
        "properties": {
            "version": { "type": "string", "enum": [PLAN_FORMAT_VERSION] },
            "locale": { "type": "string", "enum": ["en", "es"] },
            "sessionId": { "type": "string" },
            "vin": { "type": "string" },
            "mileage": { "type": "string" },
            "vehicle": {
                "type": "object",
                "required": ["make", "model", "year", "engine"],
                "properties": {
                    "make": { "type": "string" },
                    "model": { "type": "string" },
                    "year": { "type": "string" },
                    "engine": { "type": "string" }
                }
            },
            "concern": {
                "type": "object",
                "required": ["dtcs", "symptom"],
                "properties": {
                    "dtcs": string_list(),
                    "symptom": { "type": "string" }
                }
            },
            "overview": bilingual_text(),
            "safetyNotes": bilingual_list(),
            "estimatedSpecs": {
                "type": "object",
                "required": ["estimated", "items"],
                "properties": {
                    "estimated": { "type": "boolean" },
                    "items": { "type": "array", "items": spec_item }
                }
            },
            "firstStepId": { "type": "string", "minLength": 1 },
            "steps": { "type": "array", "minItems": MIN_STEPS, "items": step },
            "disclaimer": bilingual_text()
        }
    })
});

static PLAN_VALIDATOR: LazyLock<jsonschema::Validator> = LazyLock::new(|| {
    jsonschema::validator_for(&PLAN_SCHEMA).expect("built-in plan schema must compile")
});

/// The output JSON schema document
#[must_use]
pub fn plan_schema() -> &'static Value {
    &PLAN_SCHEMA
}

/// Convert a JSON pointer (`/steps/0/id`) into a dotted path (`steps.0.id`)
fn pointer_to_path(pointer: &str) -> String {
    if pointer.is_empty() || pointer == "/" {
        return "(root)".to_string();
    }
    pointer
        .trim_start_matches('/')
        .split('/')
        .map(|seg| seg.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(".")
}

fn schema_issues(value: &Value) -> Vec<ValidationIssue> {
    PLAN_VALIDATOR
        .iter_errors(value)
        .map(|e| ValidationIssue::new(pointer_to_path(&e.instance_path.to_string()), e.to_string()))
        .collect()
}

fn reference_issues(plan: &DiagnosticPlan) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut ids: HashSet<&str> = HashSet::new();

    for (i, step) in plan.steps.iter().enumerate() {
        if !ids.insert(step.id.as_str()) {
            issues.push(ValidationIssue::new(
                format!("steps.{}.id", i),
                format!("duplicate step id \"{}\"", step.id),
            ));
        }
    }

    if !ids.contains(plan.first_step_id.as_str()) {
        issues.push(ValidationIssue::new(
            "firstStepId",
            format!("references unknown step \"{}\"", plan.first_step_id),
        ));
    }

    for (i, step) in plan.steps.iter().enumerate() {
        let links = [
            ("nextOnPass", step.next_on_pass.as_deref()),
            ("nextOnFail", step.next_on_fail.as_deref()),
        ];
        for (field, target) in links {
            if let Some(target) = target {
                if !ids.contains(target) {
                    issues.push(ValidationIssue::new(
                        format!("steps.{}.{}", i, field),
                        format!("references unknown step \"{}\"", target),
                    ));
                }
            }
        }
    }

    issues
}

/// Validate a parsed model response against the output schema.
///
/// Returns the typed plan, or every issue found (callers truncate).
pub fn validate_plan(
    value: &Value,
    input: &DiagnosticInput,
) -> std::result::Result<DiagnosticPlan, Vec<ValidationIssue>> {
    let issues = schema_issues(value);
    if !issues.is_empty() {
        return Err(issues);
    }

    let plan: DiagnosticPlan = serde_json::from_value(value.clone())
        .map_err(|e| vec![ValidationIssue::new("(root)", e.to_string())])?;

    let issues = reference_issues(&plan);
    if !issues.is_empty() {
        return Err(issues);
    }

    if plan.session_id != input.session_id {
        warn!(
            expected = %input.session_id,
            got = %plan.session_id,
            "Plan sessionId does not echo the request"
        );
    }

    let unreachable = plan.unreachable_step_ids();
    if !unreachable.is_empty() {
        warn!(steps = ?unreachable, "Plan contains steps unreachable from firstStepId");
    }

    Ok(plan)
}
