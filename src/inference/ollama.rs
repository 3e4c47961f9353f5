//! Ollama client for local model inference

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::{CompletionBackend, CompletionRequest, InferenceConfig, InferenceError};

/// Timeout for lightweight metadata calls such as listing models
const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the Ollama HTTP API
#[derive(Clone)]
pub struct OllamaClient {
    http: Client,
    base_url: String,
}

/// Result of probing the runtime for a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub model: String,
    pub model_available: bool,
    pub installed_models: Vec<String>,
}

impl OllamaClient {
    /// Create a new client for the runtime at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self, InferenceError> {
        let http = Client::builder()
            .build()
            .map_err(|e| InferenceError::Connection(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &InferenceConfig) -> Result<Self, InferenceError> {
        Self::new(config.base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Names of the models installed in the runtime
    pub async fn list_models(&self) -> Result<Vec<String>, InferenceError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .http
            .get(&url)
            .timeout(METADATA_TIMEOUT)
            .send()
            .await
            .map_err(|e| map_transport_error(e, METADATA_TIMEOUT))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Upstream(format!("Status {}: {}", status, body)));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Check that the runtime is reachable and `model` is installed
    pub async fn health_check(&self, model: &str) -> Result<HealthStatus, InferenceError> {
        let installed_models = self.list_models().await?;
        let model_available = installed_models.iter().any(|m| model_matches(m, model));

        debug!(
            model = %model,
            available = model_available,
            installed = installed_models.len(),
            "Ollama health check completed"
        );

        Ok(HealthStatus {
            model: model.to_string(),
            model_available,
            installed_models,
        })
    }
}

#[async_trait]
impl CompletionBackend for OllamaClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, InferenceError> {
        let start = Instant::now();
        let url = format!("{}/api/generate", self.base_url);

        let body = GenerateRequest {
            model: &request.model,
            prompt: &request.prompt,
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        debug!(
            model = %request.model,
            prompt_length = request.prompt.len(),
            "Calling Ollama generate API"
        );

        let response = self
            .http
            .post(&url)
            .timeout(request.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let err = map_transport_error(e, request.timeout);
                error!(
                    model = %request.model,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    error = %err,
                    "Ollama generate request failed"
                );
                err
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                model = %request.model,
                status = %status,
                "Ollama generate API returned an error"
            );
            return Err(map_status_error(status, &error_text, &request.model));
        }

        let generated: GenerateResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                InferenceError::Timeout(request.timeout)
            } else {
                InferenceError::InvalidResponse(e.to_string())
            }
        })?;

        if generated.response.trim().is_empty() {
            return Err(InferenceError::InvalidResponse(
                "Model returned an empty completion".to_string(),
            ));
        }

        info!(
            model = %request.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            completion_length = generated.response.len(),
            "Ollama completion received"
        );

        Ok(generated.response)
    }
}

fn map_transport_error(e: reqwest::Error, timeout: Duration) -> InferenceError {
    if e.is_timeout() {
        InferenceError::Timeout(timeout)
    } else if e.is_connect() {
        InferenceError::Connection(e.to_string())
    } else {
        InferenceError::Upstream(e.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &str, model: &str) -> InferenceError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.to_string());

    let lowered = message.to_lowercase();
    if status == StatusCode::NOT_FOUND || (lowered.contains("model") && lowered.contains("not found")) {
        return InferenceError::UnknownModel(model.to_string());
    }

    InferenceError::Upstream(format!("Status {}: {}", status, message))
}

/// `llama3.2` matches an installed `llama3.2:latest`
fn model_matches(installed: &str, wanted: &str) -> bool {
    if installed == wanted {
        return true;
    }
    !wanted.contains(':') && installed == format!("{}:latest", wanted)
}

// Ollama API types
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn request(model: &str) -> CompletionRequest {
        CompletionRequest {
            model: model.to_string(),
            prompt: "Compare the policy".to_string(),
            temperature: 0.1,
            max_tokens: 256,
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_complete_returns_response_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::PartialJson(json!({
                "model": "llama3.2:3b",
                "stream": false,
                "options": {"num_predict": 256}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"model":"llama3.2:3b","response":"Critical: no MFA.","done":true}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(server.url()).unwrap();
        let text = client.complete(&request("llama3.2:3b")).await.unwrap();

        assert_eq!(text, "Critical: no MFA.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_model_maps_to_unknown_model() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(404)
            .with_body(r#"{"error":"model 'nope' not found, try pulling it first"}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(server.url()).unwrap();
        let err = client.complete(&request("nope")).await.unwrap_err();

        assert!(matches!(err, InferenceError::UnknownModel(ref m) if m == "nope"));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_upstream() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(500)
            .with_body(r#"{"error":"out of memory"}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(server.url()).unwrap();
        let err = client.complete(&request("llama3.2:3b")).await.unwrap_err();

        match err {
            InferenceError::Upstream(message) => assert!(message.contains("out of memory")),
            other => panic!("Expected Upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_completion_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_body(r#"{"response":"   ","done":true}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(server.url()).unwrap();
        let err = client.complete(&request("llama3.2:3b")).await.unwrap_err();

        assert!(matches!(err, InferenceError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_runtime_maps_to_connection() {
        let client = OllamaClient::new("http://127.0.0.1:1").unwrap();
        let err = client.complete(&request("llama3.2:3b")).await.unwrap_err();

        assert!(matches!(err, InferenceError::Connection(_)));
    }

    #[tokio::test]
    async fn test_health_check_finds_latest_tag() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body(r#"{"models":[{"name":"llama3.2:latest"},{"name":"mistral:7b"}]}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(format!("{}/", server.url())).unwrap();
        let status = client.health_check("llama3.2").await.unwrap();

        assert!(status.model_available);
        assert_eq!(status.installed_models.len(), 2);

        let status = client.health_check("mistral").await.unwrap();
        assert!(!status.model_available);
    }
}
