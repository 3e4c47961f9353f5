//! Configuration for local model inference

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Model runtime and sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Ollama base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier, e.g. "llama3.2:3b"
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature; low values keep the analysis factual
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String { "http://localhost:11434".to_string() }
fn default_model() -> String { "llama3.2:3b".to_string() }
fn default_temperature() -> f32 { 0.1 }
fn default_max_tokens() -> u32 { 4096 }
fn default_timeout_secs() -> u64 { 300 }

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl InferenceConfig {
    /// Override with environment variables if present
    pub fn from_env(mut self) -> Self {
        if let Ok(val) = std::env::var("OLLAMA_BASE_URL") {
            self.base_url = val;
        }

        if let Ok(val) = std::env::var("OLLAMA_MODEL") {
            self.model = val;
        }

        if let Ok(val) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(temperature) = val.parse() {
                self.temperature = temperature;
            }
        }

        if let Ok(val) = std::env::var("LLM_MAX_TOKENS") {
            if let Ok(max) = val.parse() {
                self.max_tokens = max;
            }
        }

        if let Ok(val) = std::env::var("LLM_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.timeout_secs = secs;
            }
        }

        self
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("inference.model must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "inference.temperature must be within 0.0..=2.0, got {}",
                self.temperature
            ));
        }
        if self.max_tokens == 0 {
            return Err("inference.max_tokens must be positive".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("inference.timeout_secs must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InferenceConfig::default();
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.model, "llama3.2:3b");
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.timeout(), Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_env() {
        std::env::set_var("OLLAMA_MODEL", "mistral");
        std::env::set_var("LLM_MAX_TOKENS", "2048");
        std::env::set_var("LLM_TIMEOUT_SECS", "not-a-number");

        let config = InferenceConfig::default().from_env();

        assert_eq!(config.model, "mistral");
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.timeout_secs, 300);

        // Cleanup
        std::env::remove_var("OLLAMA_MODEL");
        std::env::remove_var("LLM_MAX_TOKENS");
        std::env::remove_var("LLM_TIMEOUT_SECS");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = InferenceConfig::default();
        config.temperature = 3.5;
        assert!(config.validate().is_err());

        let mut config = InferenceConfig::default();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = InferenceConfig::default();
        config.model = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
