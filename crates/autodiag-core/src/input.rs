//! Diagnostic request input
//!
//! Required fields: `make`, `model`, `year`, `engine`, `dtcs`, `symptom`.
//! Everything else defaults to an empty string, and `language` to `en`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported locales
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English
    #[default]
    En,
    /// Spanish
    Es,
}

impl Locale {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated diagnosis request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticInput {
    /// Vehicle make
    pub make: String,
    /// Vehicle model
    pub model: String,
    /// Model year
    pub year: String,
    /// Engine description
    pub engine: String,
    /// Diagnostic trouble codes
    pub dtcs: Vec<String>,
    /// Reported symptom
    pub symptom: String,
    /// Free-form technician notes
    #[serde(default)]
    pub notes: String,
    /// Requested locale
    #[serde(default)]
    pub language: Locale,
    /// Caller correlation id, echoed in the plan
    #[serde(default)]
    pub session_id: String,
    /// Vehicle identification number, empty when unknown
    #[serde(default)]
    pub vin: String,
    /// Odometer reading, empty when unknown
    #[serde(default)]
    pub mileage: String,
}

impl DiagnosticInput {
    /// Parse a JSON request body
    pub fn from_json_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| Error::InputValidation(e.to_string()))
    }

    /// Parse an already-decoded JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::InputValidation(e.to_string()))
    }
}
