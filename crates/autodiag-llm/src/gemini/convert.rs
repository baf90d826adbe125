//! Message conversion utilities for Gemini API

use super::types::*;
use crate::message::{Message, MessageRole};

/// Convert messages to Gemini format, returning system instruction separately
pub(crate) fn convert_messages(messages: &[Message]) -> (Option<GeminiContent>, Vec<GeminiContent>) {
    let mut system_instruction = None;
    let mut gemini_contents = Vec::new();

    for msg in messages {
        match msg.role {
            MessageRole::System => {
                system_instruction = Some(GeminiContent {
                    role: None,
                    parts: vec![GeminiPart::text(msg.content.clone())],
                });
            }
            MessageRole::User => {
                if msg.content.is_empty() {
                    continue;
                }
                gemini_contents.push(GeminiContent {
                    role: Some("user".to_string()),
                    parts: vec![GeminiPart::text(msg.content.clone())],
                });
            }
        }
    }

    (system_instruction, gemini_contents)
}

/// Join the text parts of the first candidate
pub(crate) fn candidate_text(response: &GeminiResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let text: String = content
        .parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect();
    Some(text)
}
