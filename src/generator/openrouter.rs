//! OpenAI-compatible chat completions adapter (OpenRouter by default)

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{Generator, GeneratorError};
use crate::config::GeneratorConfig;
use crate::exercises::GenerationRequest;

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    transforms: Option<Vec<Value>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Generator backed by a remote chat-completions endpoint
#[derive(Clone)]
pub struct OpenRouterGenerator {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    model: String,
    extra_headers: Vec<(String, String)>,
}

impl OpenRouterGenerator {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        let extra_headers = if base_url.contains("openrouter.ai") {
            vec![
                ("HTTP-Referer".to_string(), "https://github.com/estonian-tutor".to_string()),
                ("X-Title".to_string(), "Estonian Tutor".to_string()),
            ]
        } else {
            Vec::new()
        };

        Self {
            client: Arc::new(Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            extra_headers,
        }
    }

    /// Build from config, reading the API key from the configured env var
    pub fn from_config(config: &GeneratorConfig) -> anyhow::Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            anyhow::anyhow!(
                "API key not found. Set the {} environment variable or use --offline",
                config.api_key_env
            )
        })?;
        Ok(Self::new(&config.base_url, api_key, &config.model))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request<'a>(&'a self, request: &'a GenerationRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.instructions,
                },
            ],
            max_tokens: request.sampling.max_tokens,
            temperature: request.sampling.temperature,
            top_p: request.sampling.top_p,
            transforms: self.base_url.contains("openrouter.ai").then(Vec::new),
        }
    }
}

/// Assistant text from a chat-completions response body.
///
/// Content may be a plain string or an array of `{"type": "text"}` parts.
pub fn extract_content(response: &Value) -> Result<String, GeneratorError> {
    let content = response
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"));

    match content {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Array(parts)) => Ok(parts
            .iter()
            .filter(|part| part.get("type").and_then(|t| t.as_str()) == Some("text"))
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join("")),
        _ => Err(GeneratorError::InvalidResponse(
            "no choices[0].message.content in response".to_string(),
        )),
    }
}

#[async_trait]
impl Generator for OpenRouterGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GeneratorError> {
        let body = self.build_request(request);
        debug!(
            "Requesting {} {} exercises from {}",
            request.tier, request.category, self.model
        );

        let mut req_builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key));
        for (key, value) in &self.extra_headers {
            req_builder = req_builder.header(key.as_str(), value.as_str());
        }

        let response = req_builder
            .json(&body)
            .send()
            .await
            .map_err(|e| GeneratorError::Unavailable(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GeneratorError::Unavailable(format!("failed to read body: {}", e)))?;

        if !status.is_success() {
            let err = GeneratorError::from_status(status.as_u16(), &text);
            warn!("Generator request failed: {}", err);
            return Err(err);
        }

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| GeneratorError::InvalidResponse(format!("response is not JSON: {}", e)))?;
        extract_content(&value)
    }
}
