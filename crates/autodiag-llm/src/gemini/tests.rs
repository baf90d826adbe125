//! Tests for Gemini provider

use super::config::{GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, MODELS};
use super::convert::{candidate_text, convert_messages};
use super::provider::GeminiProvider;
use super::types::GeminiResponse;
use crate::completion::CompletionRequest;
use crate::message::Message;
use std::time::Duration;

#[test]
fn test_config_builder() {
    let config = GeminiConfig::new("test-key")
        .with_model("gemini-2.5-pro")
        .with_max_tokens(4096)
        .with_timeout(Duration::from_secs(30));

    assert_eq!(config.api_key, "test-key");
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.default_model, "gemini-2.5-pro");
    assert_eq!(config.default_max_tokens, 4096);
    assert_eq!(config.timeout, Duration::from_secs(30));
}

#[test]
fn test_default_model_is_listed() {
    assert!(MODELS.contains(&DEFAULT_MODEL));
}

#[test]
fn test_message_conversion() {
    let messages = vec![
        Message::system("Answer in JSON"),
        Message::user("Hello"),
        Message::user(""),
    ];

    let (system, converted) = convert_messages(&messages);

    assert!(system.is_some());
    assert_eq!(converted.len(), 1);
    assert_eq!(converted[0].role, Some("user".to_string()));
}

#[test]
fn test_request_carries_temperature() {
    let provider = GeminiProvider::new(GeminiConfig::new("AIza1234567890abcdefghij")).unwrap();
    let request = CompletionRequest::new("")
        .with_message(Message::user("diagnose"))
        .with_temperature(0.2);

    let wire = serde_json::to_value(provider.build_request(&request)).unwrap();

    assert_eq!(wire["contents"][0]["parts"][0]["text"], "diagnose");
    assert_eq!(wire["generationConfig"]["maxOutputTokens"], 8192);
    let temperature = wire["generationConfig"]["temperature"].as_f64().unwrap();
    assert!((temperature - 0.2).abs() < 1e-6);
    assert!(wire.get("systemInstruction").is_none());
}

#[test]
fn test_candidate_text_joins_parts() {
    let response: GeminiResponse = serde_json::from_str(
        r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "{\"a\":"}, {"text": "1}"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 10, "totalTokenCount": 12}
        }"#,
    )
    .unwrap();

    assert_eq!(candidate_text(&response).as_deref(), Some("{\"a\":1}"));
    let usage = response.usage_metadata.unwrap();
    assert_eq!(usage.candidates_token_count, None);
}

#[test]
fn test_candidate_text_empty_candidates() {
    let response: GeminiResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
    assert!(candidate_text(&response).is_none());
}

#[test]
fn test_config_debug_masks_key() {
    let config = GeminiConfig::new("AIza1234567890abcdefghij");
    let debug_str = format!("{:?}", config);

    assert!(!debug_str.contains("1234567890"));
    assert!(debug_str.contains("AIza...ghij"));
}
