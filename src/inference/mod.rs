//! Language model inference
//!
//! The pipeline only sees the [`CompletionBackend`] trait: a prompt and
//! sampling parameters go in, a text completion comes out. [`OllamaClient`]
//! is the default backend for a local Ollama runtime.

pub mod config;
pub mod ollama;
pub mod prompts;

pub use config::InferenceConfig;
pub use ollama::{HealthStatus, OllamaClient};

use async_trait::async_trait;
use std::time::Duration;

/// A single completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl CompletionRequest {
    /// Build a request using the sampling parameters from `config`
    pub fn new(prompt: String, config: &InferenceConfig) -> Self {
        Self {
            model: config.model.clone(),
            prompt,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: config.timeout(),
        }
    }
}

/// Inference errors
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Connection to model runtime failed: {0}")]
    Connection(String),

    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Model '{0}' is not available")]
    UnknownModel(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl InferenceError {
    /// Stable reason code for callers and logs
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection_failed",
            Self::Timeout(_) => "timeout",
            Self::UnknownModel(_) => "unknown_model",
            Self::Upstream(_) => "upstream_error",
            Self::InvalidResponse(_) => "invalid_response",
        }
    }

    /// Likely fix for the failure
    pub fn hint(&self) -> String {
        match self {
            Self::Connection(_) => {
                "Ensure the model runtime is running ('ollama serve') and reachable".to_string()
            }
            Self::Timeout(_) => {
                "Increase inference.timeout_secs or choose a smaller model".to_string()
            }
            Self::UnknownModel(model) => format!("Download the model first: 'ollama pull {}'", model),
            Self::Upstream(_) => "Check the model runtime logs for details".to_string(),
            Self::InvalidResponse(_) => {
                "Retry the request; the runtime returned an unusable completion".to_string()
            }
        }
    }
}

/// Text completion backend
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Complete `request.prompt`; no retries are attempted
    async fn complete(&self, request: &CompletionRequest) -> Result<String, InferenceError>;
}
