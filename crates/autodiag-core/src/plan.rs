//! Diagnostic plan types
//!
//! A plan is always fully bilingual: every text field carries both `en` and
//! `es` regardless of the requested locale. Steps form a directed graph via
//! `nextOnPass` / `nextOnFail`, walked from `firstStepId`. Cycles are allowed.

use crate::input::Locale;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// Format version tag every plan carries
pub const PLAN_FORMAT_VERSION: &str = "1.0";

/// Parallel English/Spanish text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilingualText {
    /// English
    pub en: String,
    /// Spanish
    pub es: String,
}

impl BilingualText {
    /// Text for a locale
    #[must_use]
    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.en,
            Locale::Es => &self.es,
        }
    }
}

/// Parallel English/Spanish ordered lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilingualList {
    /// English
    pub en: Vec<String>,
    /// Spanish
    pub es: Vec<String>,
}

impl BilingualList {
    /// Items for a locale
    #[must_use]
    pub fn get(&self, locale: Locale) -> &[String] {
        match locale {
            Locale::En => &self.en,
            Locale::Es => &self.es,
        }
    }
}

/// Vehicle echo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSummary {
    /// Make
    pub make: String,
    /// Model
    pub model: String,
    /// Year
    pub year: String,
    /// Engine
    pub engine: String,
}

/// Concern echo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultConcern {
    /// Trouble codes
    pub dtcs: Vec<String>,
    /// Symptom
    pub symptom: String,
}

/// One estimated specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecItem {
    /// Name
    pub name: BilingualText,
    /// Value range, e.g. "0.1-0.9"
    pub range: String,
    /// Unit, e.g. "V"
    pub unit: String,
    /// Annotation
    pub note: BilingualText,
}

/// Estimated-specifications block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatedSpecs {
    /// Whether the values are synthetic estimates
    pub estimated: bool,
    /// Items
    pub items: Vec<SpecItem>,
}

/// Where to probe and what to expect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorHint {
    /// Connector or pin label
    pub label: BilingualText,
    /// Test to perform
    pub test: BilingualText,
    /// Expected value range
    pub expected: String,
    /// Whether `expected` is an estimate
    pub estimated: bool,
    /// Notes
    pub notes: BilingualText,
}

/// One node of the diagnostic procedure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Stable identifier (`step-N`)
    pub id: String,
    /// Title
    pub title: BilingualText,
    /// Why this step is performed
    pub purpose: BilingualText,
    /// Ordered instructions
    pub procedure: BilingualList,
    /// Connector hints
    pub connector_hints: Vec<ConnectorHint>,
    /// Pass criteria
    pub pass_criteria: BilingualList,
    /// Fail criteria
    pub fail_criteria: BilingualList,
    /// Step to go to when this one passes
    pub next_on_pass: Option<String>,
    /// Step to go to when this one fails
    pub next_on_fail: Option<String>,
}

impl Step {
    /// Non-null successor ids (pass first)
    pub fn successors(&self) -> impl Iterator<Item = &str> {
        self.next_on_pass
            .as_deref()
            .into_iter()
            .chain(self.next_on_fail.as_deref())
    }
}

/// The validated model output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticPlan {
    /// Format version tag
    pub version: String,
    /// Resolved locale
    pub locale: Locale,
    /// Echo of the input session id
    pub session_id: String,
    /// VIN, empty when unknown
    pub vin: String,
    /// Mileage, empty when unknown
    pub mileage: String,
    /// Vehicle echo
    pub vehicle: VehicleSummary,
    /// Concern echo
    pub concern: FaultConcern,
    /// Overview
    pub overview: BilingualText,
    /// Safety notes
    pub safety_notes: BilingualList,
    /// Estimated specifications
    pub estimated_specs: EstimatedSpecs,
    /// Entry point into `steps`
    pub first_step_id: String,
    /// Ordered steps
    pub steps: Vec<Step>,
    /// Disclaimer
    pub disclaimer: BilingualText,
}

impl DiagnosticPlan {
    /// Look up a step by id
    #[must_use]
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// First step, if `firstStepId` resolves
    #[must_use]
    pub fn first_step(&self) -> Option<&Step> {
        self.step(&self.first_step_id)
    }

    /// Ids of steps not reachable from `firstStepId`, in list order.
    ///
    /// Dangling links are ignored here; they are reported by validation.
    #[must_use]
    pub fn unreachable_step_ids(&self) -> Vec<&str> {
        let index: HashMap<&str, &Step> = self.steps.iter().map(|s| (s.id.as_str(), s)).collect();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();

        if index.contains_key(self.first_step_id.as_str()) {
            queue.push_back(self.first_step_id.as_str());
        }
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(step) = index.get(id) {
                for next in step.successors() {
                    if index.contains_key(next) && !seen.contains(next) {
                        queue.push_back(next);
                    }
                }
            }
        }

        self.steps
            .iter()
            .map(|s| s.id.as_str())
            .filter(|id| !seen.contains(id))
            .collect()
    }
}
