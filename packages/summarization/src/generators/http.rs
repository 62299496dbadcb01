//! OpenAI-compatible completion backend.
//!
//! Talks to any server exposing `/v1/completions` (llama.cpp server,
//! Ollama, vLLM) so the pipeline can run against a locally hosted model.
//!
//! # Example
//!
//! ```rust,ignore
//! use summarization::generators::HttpGenerator;
//! use summarization::{BuiltinTemplates, SerializedGenerator, Summarizer};
//!
//! let generator = SerializedGenerator::new(HttpGenerator::new("http://127.0.0.1:8080"));
//! let summarizer = Summarizer::new(generator, BuiltinTemplates);
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SummarizationError};
use crate::traits::generator::{Generator, STOP_SEQUENCES};

const DEFAULT_MODEL: &str = "local";

/// Completion client for a local inference server.
#[derive(Clone)]
pub struct HttpGenerator {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
    top_p: f32,
    repeat_penalty: f32,
}

impl HttpGenerator {
    /// Create a client for the server at `base_url` (without `/v1`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.05,
            top_p: 0.95,
            repeat_penalty: 1.15,
        }
    }

    /// Create from environment variables `FS_LLM_URL` and optional `FS_LLM_MODEL`.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("FS_LLM_URL")
            .map_err(|_| SummarizationError::Config("FS_LLM_URL not set".into()))?;
        let generator = Self::new(base_url);
        Ok(match std::env::var("FS_LLM_MODEL") {
            Ok(model) if !model.trim().is_empty() => generator.with_model(model),
            _ => generator,
        })
    }

    /// Set the model name sent with each request (default: "local").
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Get the current model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/completions", self.base_url)
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: usize,
    temperature: f32,
    top_p: f32,
    repeat_penalty: f32,
    stop: &'a [&'a str],
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: Option<String>,
}

impl CompletionResponse {
    fn into_text(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.text)
            .map(|t| t.trim().to_string())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String> {
        let request = CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            repeat_penalty: self.repeat_penalty,
            stop: STOP_SEQUENCES,
        };

        let response = self
            .client
            .post(self.completions_url())
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(SummarizationError::generation)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SummarizationError::generation(format!(
                "completion server error ({}): {}",
                status, error_text
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(SummarizationError::generation)?;
        let text = completion.into_text();
        debug!(output_chars = text.len(), max_tokens, "completion received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let generator = HttpGenerator::new("http://127.0.0.1:8080/");
        assert_eq!(generator.completions_url(), "http://127.0.0.1:8080/v1/completions");
        assert_eq!(generator.model(), "local");
    }

    #[test]
    fn test_request_carries_sampling_and_stops() {
        let request = CompletionRequest {
            model: "local",
            prompt: "p",
            max_tokens: 180,
            temperature: 0.05,
            top_p: 0.95,
            repeat_penalty: 1.15,
            stop: STOP_SEQUENCES,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["max_tokens"], 180);
        assert_eq!(json["stop"][4], "</TEKST>");
    }

    #[test]
    fn test_response_text_is_trimmed_or_empty() {
        let response: CompletionResponse =
            serde_json::from_str(r#"{"choices":[{"text":"  - feit\n"}]}"#).unwrap();
        assert_eq!(response.into_text(), "- feit");

        let empty: CompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(empty.into_text(), "");

        let missing: CompletionResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.into_text(), "");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_generation_error() {
        let generator = HttpGenerator::new("http://127.0.0.1:9");
        let err = generator.generate("p", 8).await.unwrap_err();
        assert!(err.is_generation());
    }
}
