//! Completion provider abstraction and implementations.
//!
//! Defines the [`CompletionProvider`] trait and two implementations:
//! - **[`DisabledProvider`]** - always fails; every caller then takes its
//!   deterministic fallback path.
//! - **[`OpenAiProvider`]** - calls an OpenAI-compatible
//!   `POST {base_url}/chat/completions` endpoint.
//!
//! # Failure Policy
//!
//! There is no retry. A failed call (network error, non-2xx status, body
//! without a message) is reported once as a [`CompletionError`] and the
//! caller substitutes fallback data.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::LlmConfig;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion provider is disabled")]
    Disabled,

    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion API rate limit exceeded")]
    RateLimited,

    #[error("completion API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion response has no message content")]
    EmptyResponse,
}

/// A single chat message sent to the completion API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A prompt plus an informal description of the JSON shape expected back.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub text: String,
    pub schema_hint: String,
}

impl Prompt {
    /// Ordered message list: system instructions carrying the schema hint,
    /// then the user prompt.
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(format!(
                "You are a market research analyst. Respond with a single JSON object \
                 and nothing else. The object must have this shape:\n{}",
                self.schema_hint
            )),
            ChatMessage::user(self.text.clone()),
        ]
    }
}

/// Capability to turn a prompt into model text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"gpt-4o-mini"`).
    fn model_name(&self) -> &str;

    /// Runs one completion. Implementations must not retry.
    async fn complete(&self, prompt: &Prompt) -> Result<String, CompletionError>;
}

// ============ Disabled Provider ============

/// Provider used when no model is configured or no API key is available.
pub struct DisabledProvider;

#[async_trait]
impl CompletionProvider for DisabledProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _prompt: &Prompt) -> Result<String, CompletionError> {
        Err(CompletionError::Disabled)
    }
}

// ============ OpenAI Provider ============

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

/// Provider backed by an OpenAI-compatible chat completions endpoint.
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    api_key: String,
}

impl OpenAiProvider {
    pub fn new(config: &LlmConfig, api_key: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            api_key,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, CompletionError> {
        let body = ChatRequest {
            model: &self.model,
            messages: prompt.messages(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(CompletionError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = response.json().await?;
        parse_chat_response(&json)
    }
}

/// Extracts `choices[0].message.content` from a chat completions response.
fn parse_chat_response(json: &serde_json::Value) -> Result<String, CompletionError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .filter(|c| !c.trim().is_empty())
        .map(|c| c.to_string())
        .ok_or(CompletionError::EmptyResponse)
}

/// Create the appropriate [`CompletionProvider`] based on configuration.
///
/// | Config Value | Provider |
/// |-------------|----------|
/// | `"disabled"` | [`DisabledProvider`] |
/// | `"openai"` | [`OpenAiProvider`], or [`DisabledProvider`] when no API key is set |
pub fn create_provider(config: &LlmConfig) -> anyhow::Result<Box<dyn CompletionProvider>> {
    if !config.is_enabled() {
        return Ok(Box::new(DisabledProvider));
    }
    match config.provider.as_str() {
        "openai" => match config.api_key() {
            Some(key) => Ok(Box::new(OpenAiProvider::new(config, key)?)),
            None => {
                tracing::warn!(
                    env = %config.api_key_env,
                    "no API key set, analyses will use catalog fallbacks"
                );
                Ok(Box::new(DisabledProvider))
            }
        },
        other => anyhow::bail!("Unknown llm provider: {}", other),
    }
}
