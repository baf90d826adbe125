//! Generation and repair prompts
//!
//! The generation prompt spells out the exact output structure (one-to-one
//! with [`crate::schema::plan_schema`]), the domain rules, and then appends
//! the case facts as JSON. The repair prompt is the generation prompt plus
//! the previous attempt's validation issues.

use crate::error::{Error, Result};
use crate::input::DiagnosticInput;
use crate::plan::PLAN_FORMAT_VERSION;
use crate::schema::{ValidationIssue, MAX_REPORTED_ISSUES, MIN_STEPS};

/// Required output structure. `{version}` and `{min_steps}` are filled in.
const OUTPUT_STRUCTURE: &str = r#"{
  "version": "{version}",
  "locale": "en" | "es",
  "sessionId": string,
  "vin": string,
  "mileage": string,
  "vehicle": { "make": string, "model": string, "year": string, "engine": string },
  "concern": { "dtcs": string[], "symptom": string },
  "overview": { "en": string, "es": string },
  "safetyNotes": { "en": string[], "es": string[] },
  "estimatedSpecs": {
    "estimated": boolean,
    "items": [
      {
        "name": { "en": string, "es": string },
        "range": string,
        "unit": string,
        "note": { "en": string, "es": string }
      }
    ]
  },
  "firstStepId": "step-1",
  "steps": [
    {
      "id": "step-N",
      "title": { "en": string, "es": string },
      "purpose": { "en": string, "es": string },
      "procedure": { "en": string[], "es": string[] },
      "connectorHints": [
        {
          "label": { "en": string, "es": string },
          "test": { "en": string, "es": string },
          "expected": string,
          "estimated": boolean,
          "notes": { "en": string, "es": string }
        }
      ],
      "passCriteria": { "en": string[], "es": string[] },
      "failCriteria": { "en": string[], "es": string[] },
      "nextOnPass": "step-N" | null,
      "nextOnFail": "step-N" | null
    }
  ],
  "disclaimer": { "en": string, "es": string }
}"#;

const RULES: &str = "\
Rules:
- Respond with a single JSON object and nothing else. No prose, no markdown, no code fences.
- Use exactly the keys shown in the structure. Do not omit any key.
- If the VIN or mileage is unknown, use an empty string \"\". Never omit them.
- All numeric specifications and ranges are synthetic estimates: set \"estimated\": true and say so in the notes.
- Do not reproduce proprietary wiring-diagram content. Where a diagram would help, write only: \"Refer to the manufacturer's service information for the wiring diagram.\"
- Every bilingual field must contain both \"en\" and \"es\" text, whatever the requested locale.
- Produce at least {min_steps} steps.
- Step ids follow the pattern \"step-1\", \"step-2\", ... and never change meaning.
- \"firstStepId\" must be \"step-1\".
- \"nextOnPass\" / \"nextOnFail\" must be an existing step id or null.
- \"sessionId\" must echo the case sessionId exactly.";

/// Build the generation prompt for a validated input
pub fn build_prompt(input: &DiagnosticInput) -> Result<String> {
    let facts = serde_json::to_string_pretty(input)
        .map_err(|e| Error::Internal(format!("failed to serialize case facts: {}", e)))?;

    let structure = OUTPUT_STRUCTURE.replace("{version}", PLAN_FORMAT_VERSION);
    let rules = RULES.replace("{min_steps}", &MIN_STEPS.to_string());

    Ok(format!(
        "You are an automotive diagnostic technician writing a step-by-step diagnostic procedure.\n\
         Requested locale: {locale}.\n\n\
         Return JSON with exactly this structure:\n{structure}\n\n\
         {rules}\n\n\
         Case facts:\n{facts}",
        locale = input.language,
    ))
}

/// Build the repair prompt: the original prompt plus the issues to fix
#[must_use]
pub fn build_repair_prompt(base_prompt: &str, issues: &[ValidationIssue]) -> String {
    let listed = issues
        .iter()
        .take(MAX_REPORTED_ISSUES)
        .map(|issue| format!("- {}", issue))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{base_prompt}\n\n\
         Your previous response failed validation with these issues:\n{listed}\n\n\
         Return corrected JSON only, satisfying the required structure exactly."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input() -> DiagnosticInput {
        DiagnosticInput::from_value(json!({
            "make": "Honda",
            "model": "Civic",
            "year": "2015",
            "engine": "1.8L",
            "dtcs": ["P0420", "P0171"],
            "symptom": "Check engine light on",
            "language": "es",
            "sessionId": "sess-7",
            "vin": "1HGCM82633A004352"
        }))
        .unwrap()
    }

    #[test]
    fn test_prompt_contains_case_facts() {
        let prompt = build_prompt(&input()).unwrap();

        assert!(prompt.contains("\"make\": \"Honda\""));
        assert!(prompt.contains("\"P0171\""));
        assert!(prompt.contains("\"sessionId\": \"sess-7\""));
        assert!(prompt.contains("\"mileage\": \"\""));
        assert!(prompt.contains("Requested locale: es."));
    }

    #[test]
    fn test_prompt_states_rules() {
        let prompt = build_prompt(&input()).unwrap();

        assert!(prompt.contains("No prose, no markdown, no code fences"));
        assert!(prompt.contains("at least 5 steps"));
        assert!(prompt.contains("\"firstStepId\" must be \"step-1\""));
        assert!(prompt.contains("\"version\": \"1.0\""));
        assert!(!prompt.contains("{min_steps}"));
        assert!(!prompt.contains("{version}"));
    }

    #[test]
    fn test_prompt_structure_lists_every_required_key() {
        let prompt = build_prompt(&input()).unwrap();
        let schema = crate::schema::plan_schema();

        for key in schema["required"].as_array().unwrap() {
            let key = key.as_str().unwrap();
            assert!(prompt.contains(&format!("\"{}\"", key)), "missing {}", key);
        }
        for key in schema["properties"]["steps"]["items"]["required"]
            .as_array()
            .unwrap()
        {
            let key = key.as_str().unwrap();
            assert!(prompt.contains(&format!("\"{}\"", key)), "missing {}", key);
        }
    }

    #[test]
    fn test_repair_prompt_lists_issues_verbatim() {
        let issues = vec![
            ValidationIssue::new("steps.1", "\"id\" is a required property"),
            ValidationIssue::new("firstStepId", "references unknown step \"x\""),
        ];

        let repair = build_repair_prompt("BASE", &issues);

        assert!(repair.starts_with("BASE\n\n"));
        assert!(repair.contains("- steps.1: \"id\" is a required property"));
        assert!(repair.contains("- firstStepId: references unknown step \"x\""));
        assert!(repair.ends_with("satisfying the required structure exactly."));
    }

    #[test]
    fn test_repair_prompt_caps_issues() {
        let issues: Vec<ValidationIssue> = (0..10)
            .map(|i| ValidationIssue::new(format!("steps.{}", i), "bad"))
            .collect();

        let repair = build_repair_prompt("BASE", &issues);
        assert!(repair.contains("- steps.7: bad"));
        assert!(!repair.contains("- steps.8: bad"));
    }
}
