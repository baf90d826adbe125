//! JSON extraction from model text
//!
//! Models wrap JSON in code fences or surround it with commentary despite
//! instructions. Extraction is two-staged and reports which stage succeeded:
//! 1. `Strict`: the trimmed text, or failing that the body of a fence
//!    wrapping the whole reply, is a JSON object.
//! 2. `BraceSlice`: the substring from the first `{` to the last `}` is.
//!
//! Fence markers are only removed at the ends of the reply. Text inside the
//! object, including fence markers in string values, is never rewritten.

use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\A\s*```(?:json)?").expect("fence pattern is valid"));

static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```\s*\z").expect("fence pattern is valid"));

/// Which stage produced the value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStage {
    /// Whole reply, or whole fence body, parsed as-is
    Strict,
    /// First-brace/last-brace fallback
    BraceSlice,
}

impl fmt::Display for ExtractionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("strict"),
            Self::BraceSlice => f.write_str("brace_slice"),
        }
    }
}

/// A JSON object pulled out of model text
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Parsed object
    pub value: Value,
    /// Stage that produced it
    pub stage: ExtractionStage,
}

/// Why extraction failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// No `{ ... }` span at all
    #[error("no JSON object found in model output")]
    NoObject,

    /// A brace span exists but is not valid JSON
    #[error("model output is not valid JSON: {0}")]
    Malformed(String),
}

/// Remove a leading ```` ``` ```` / ```` ```json ```` marker and a trailing
/// ```` ``` ```` marker, then trim
#[must_use]
pub fn strip_code_fences(raw: &str) -> String {
    let opened = OPENING_FENCE.replace(raw, "");
    CLOSING_FENCE.replace(&opened, "").trim().to_string()
}

fn parse_object(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Substring from the first `{` to the last `}` inclusive
#[must_use]
pub fn slice_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Extract a JSON object from raw model output.
pub fn extract_json(raw: &str) -> Result<Extraction, ExtractError> {
    if let Some(value) = parse_object(raw.trim()) {
        return Ok(Extraction {
            value,
            stage: ExtractionStage::Strict,
        });
    }

    let text = strip_code_fences(raw);
    if let Some(value) = parse_object(&text) {
        return Ok(Extraction {
            value,
            stage: ExtractionStage::Strict,
        });
    }

    let slice = slice_braces(&text).ok_or(ExtractError::NoObject)?;
    match serde_json::from_str::<Value>(slice) {
        Ok(value @ Value::Object(_)) => {
            debug!(
                skipped_bytes = text.len() - slice.len(),
                "Recovered JSON object via brace slice"
            );
            Ok(Extraction {
                value,
                stage: ExtractionStage::BraceSlice,
            })
        }
        Ok(_) => Err(ExtractError::NoObject),
        Err(e) => Err(ExtractError::Malformed(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fence() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_bare_fence_and_whitespace() {
        let raw = "  \n```\n  {\"a\": 1}  \n```  \n";
        assert_eq!(strip_code_fences(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_without_fences_only_trims() {
        assert_eq!(strip_code_fences("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_keeps_inner_fences() {
        let raw = "```json\n{\"tip\": \"use ```json here\"}\n```";
        assert_eq!(strip_code_fences(raw), "{\"tip\": \"use ```json here\"}");
    }

    #[test]
    fn test_slice_braces() {
        let text = "Here is the plan: {\"a\": {\"b\": 2}} Hope this helps!";
        assert_eq!(slice_braces(text), Some("{\"a\": {\"b\": 2}}"));
    }

    #[test]
    fn test_slice_braces_absent() {
        assert_eq!(slice_braces("no json here"), None);
        assert_eq!(slice_braces("} backwards {"), None);
    }

    #[test]
    fn test_extract_strict() {
        let extraction = extract_json("```json\n{\"steps\": []}\n```").unwrap();
        assert_eq!(extraction.stage, ExtractionStage::Strict);
        assert_eq!(extraction.value["steps"], serde_json::json!([]));
    }

    #[test]
    fn test_extract_bare_object_is_untouched() {
        let raw = "{\"tip\": \"Wrap the code in ```json blocks\"}";
        let extraction = extract_json(raw).unwrap();
        assert_eq!(extraction.stage, ExtractionStage::Strict);
        assert_eq!(extraction.value["tip"], "Wrap the code in ```json blocks");
    }

    #[test]
    fn test_extract_fenced_object_keeps_inner_fences() {
        let raw = "```json\n{\"tip\": \"end with ```\"}\n```\n";
        let extraction = extract_json(raw).unwrap();
        assert_eq!(extraction.stage, ExtractionStage::Strict);
        assert_eq!(extraction.value["tip"], "end with ```");
    }

    #[test]
    fn test_extract_brace_slice_fallback() {
        let extraction = extract_json("Sure! {\"ok\": true} Let me know.").unwrap();
        assert_eq!(extraction.stage, ExtractionStage::BraceSlice);
        assert_eq!(extraction.value["ok"], serde_json::json!(true));
    }

    #[test]
    fn test_extract_plain_prose() {
        let err = extract_json("I cannot produce a plan for this vehicle.").unwrap_err();
        assert_eq!(err, ExtractError::NoObject);
    }

    #[test]
    fn test_extract_malformed() {
        let err = extract_json("{\"steps\": [1, 2,}").unwrap_err();
        assert!(matches!(err, ExtractError::Malformed(_)));
    }

    #[test]
    fn test_extract_rejects_non_object_json() {
        assert_eq!(extract_json("[1, 2, 3]").unwrap_err(), ExtractError::NoObject);
    }
}
