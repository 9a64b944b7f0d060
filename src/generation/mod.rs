//! Text generation client abstraction and the Ollama-backed adapter.
//!
//! The pipeline sends one fully assembled prompt per call and expects one complete response:
//! no streaming, no retries. The Ollama adapter mirrors the embedding adapter by issuing
//! HTTP requests directly to the runtime.

use crate::config::get_config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced while generating text.
#[derive(Debug, Error)]
pub enum GenerationClientError {
    /// Provider endpoint could not be reached.
    #[error("Generation provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate text: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by text generation backends.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generate a completion for the supplied prompt using the configured model.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationClientError>;
}

/// Build the generation client configured for this process.
pub fn get_generation_client() -> Box<dyn GenerationClient> {
    let config = get_config();
    Box::new(OllamaGenerationClient::new(
        config.ollama_url.clone(),
        config.generation_model.clone(),
    ))
}

/// Generation client backed by the Ollama `/api/generate` endpoint.
pub struct OllamaGenerationClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaGenerationClient {
    /// Construct a client for the given Ollama base URL and model identifier.
    pub fn new(base_url: String, model: String) -> Self {
        let http = Client::builder()
            .user_agent("docrag/generate")
            .build()
            .expect("Failed to construct reqwest::Client for generation");
        Self {
            http,
            base_url,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl GenerationClient for OllamaGenerationClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationClientError> {
        let payload = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                GenerationClientError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GenerationClientError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationClientError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaGenerateResponse = response.json().await.map_err(|error| {
            GenerationClientError::InvalidResponse(format!(
                "failed to decode Ollama response: {error}"
            ))
        })?;

        if !body.done {
            return Err(GenerationClientError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.response.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn client_for(server: &MockServer) -> OllamaGenerationClient {
        OllamaGenerationClient::new(server.base_url(), "llama3.2".into())
    }

    #[tokio::test]
    async fn generate_returns_trimmed_response() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/generate")
                    .json_body(serde_json::json!({
                        "model": "llama3.2",
                        "prompt": "Answer the question",
                        "stream": false,
                    }));
                then.status(200).json_body(serde_json::json!({
                    "response": "  The answer.  ",
                    "done": true
                }));
            })
            .await;

        let text = client_for(&server)
            .generate("Answer the question")
            .await
            .expect("generation");

        mock.assert();
        assert_eq!(text, "The answer.");
    }

    #[tokio::test]
    async fn generate_surfaces_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(500).body("boom");
            })
            .await;

        let error = client_for(&server)
            .generate("prompt")
            .await
            .expect_err("error response");
        assert!(
            matches!(error, GenerationClientError::GenerationFailed(message) if message.contains("500"))
        );
    }

    #[tokio::test]
    async fn generate_rejects_incomplete_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200).json_body(serde_json::json!({
                    "response": "partial",
                    "done": false
                }));
            })
            .await;

        let error = client_for(&server)
            .generate("prompt")
            .await
            .expect_err("incomplete response");
        assert!(matches!(error, GenerationClientError::InvalidResponse(_)));
    }
}
