//! Ollama model server client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::error::{LlmError, LlmResult};
use super::LanguageModel;
use crate::config::LlmConfig;

/// Ollama `/api/generate` client with deterministic sampling.
///
/// Requests ask for JSON-formatted output at temperature 0. No HTTP timeout
/// is set here; callers bound each attempt with their own deadline.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'static str,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.host.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    async fn complete(&self, prompt: &str) -> LlmResult<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: "json",
            options: GenerateOptions { temperature: 0.0 },
        };

        let response = self
            .http
            .post(self.generate_url())
            .json(&request)
            .send()
            .await
            .map_err(LlmError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        let generated: GenerateResponse = response.json().await.map_err(LlmError::Transport)?;
        Ok(generated.response)
    }
}
