//! Server configuration types

use autodiag_core::DiagnosisSettings;
use autodiag_llm::GeminiConfig;
use autodiag_llm::util::mask_api_key;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8090,
        }
    }
}

/// Text generation provider configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Explicit credential; falls back to `GEMINI_API_KEY` / `GOOGLE_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    autodiag_llm::gemini::DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    autodiag_llm::gemini::DEFAULT_BASE_URL.to_string()
}

fn default_temperature() -> f32 {
    autodiag_core::DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    8192
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_deref().map(mask_api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl LlmConfig {
    /// Resolve the credential: `llm.api_key`, then `GEMINI_API_KEY`, then
    /// `GOOGLE_API_KEY`. Empty values count as absent.
    #[must_use]
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    fn resolve_api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        non_empty(self.api_key.clone())
            .or_else(|| non_empty(lookup("GEMINI_API_KEY")))
            .or_else(|| non_empty(lookup("GOOGLE_API_KEY")))
    }

    /// Handler settings for this configuration
    #[must_use]
    pub fn diagnosis_settings(&self, api_key: Option<String>) -> DiagnosisSettings {
        DiagnosisSettings {
            api_key,
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
        }
    }

    /// Provider configuration for this configuration
    #[must_use]
    pub fn gemini_config(&self, api_key: Option<String>) -> GeminiConfig {
        GeminiConfig::new(api_key.unwrap_or_default())
            .with_base_url(self.base_url.clone())
            .with_model(self.model.clone())
            .with_max_tokens(self.max_tokens)
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_key_wins() {
        let config = LlmConfig {
            api_key: Some("from-config".to_string()),
            ..LlmConfig::default()
        };
        let key = config.resolve_api_key_with(|_| Some("from-env".to_string()));
        assert_eq!(key.as_deref(), Some("from-config"));
    }

    #[test]
    fn test_gemini_key_before_google_key() {
        let config = LlmConfig::default();
        let key = config.resolve_api_key_with(|name| match name {
            "GEMINI_API_KEY" => Some("gemini".to_string()),
            "GOOGLE_API_KEY" => Some("google".to_string()),
            _ => None,
        });
        assert_eq!(key.as_deref(), Some("gemini"));
    }

    #[test]
    fn test_empty_values_are_absent() {
        let config = LlmConfig {
            api_key: Some(String::new()),
            ..LlmConfig::default()
        };
        let key = config.resolve_api_key_with(|name| match name {
            "GEMINI_API_KEY" => Some("  ".to_string()),
            "GOOGLE_API_KEY" => Some("google".to_string()),
            _ => None,
        });
        assert_eq!(key.as_deref(), Some("google"));

        assert_eq!(config.resolve_api_key_with(|_| None), None);
    }

    #[test]
    fn test_settings_carry_sampling() {
        let settings = LlmConfig::default().diagnosis_settings(Some("k".to_string()));
        assert_eq!(settings.model, "gemini-2.5-flash");
        assert_eq!(settings.temperature, 0.2);
        assert_eq!(settings.max_tokens, Some(8192));
        assert!(settings.has_credential());
    }

    #[test]
    fn test_debug_masks_key() {
        let config = LlmConfig {
            api_key: Some("AIzaSyVerySecretKey000".to_string()),
            ..LlmConfig::default()
        };
        assert!(!format!("{:?}", config).contains("VerySecret"));
    }
}
