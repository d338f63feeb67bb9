//! OpenAI-compatible chat client.
//!
//! Works against any endpoint speaking the `/chat/completions` dialect.
//! Decisions run at temperature 0 so categorical fields stay stable across
//! repeated parses of the same prompt.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::traits::LanguageModel;

/// Chat client for an OpenAI-compatible API.
#[derive(Clone)]
pub struct OpenAiModel {
    client: Client,
    api_key: SecretString,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAiModel {
    /// Create a client with the given API key and model name.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let timeout = Duration::from_secs(60);
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("reqwest client construction cannot fail with static config"),
            api_key: SecretString::from(api_key.into()),
            model: model.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout,
        }
    }

    /// Create from the `OPENAI_API_KEY` environment variable.
    pub fn from_env(model: impl Into<String>) -> ModelResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ModelError::Request("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key, model))
    }

    /// Set a custom base URL (Azure, proxies, local gateways).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client construction cannot fail with static config");
        self
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    async fn complete(&self, system: &str, user: &str) -> ModelResult<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage { role: "system".to_string(), content: system.to_string() },
                ChatMessage { role: "user".to_string(), content: user.to_string() },
            ],
            temperature: 0.0,
            max_tokens: 4096,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key.expose_secret()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout { seconds: self.timeout.as_secs() }
                } else {
                    ModelError::Request(Box::new(e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Request(
                format!("API error {status}: {body}").into(),
            ));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Request(Box::new(e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ModelError::EmptyResponse);
        }
        Ok(content)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}
