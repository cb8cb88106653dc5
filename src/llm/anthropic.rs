//! Anthropic Messages API backend.
//!
//! The system prompt goes in a top-level field rather than a message, and
//! the reply is a list of content blocks of which only text blocks matter.

use super::{CompletionBackend, CompletionParams};
use crate::error::{ReferatError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Backend for Anthropic's Messages API.
pub struct AnthropicBackend {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl AnthropicBackend {
    /// Create a backend against `base_url` (normally `https://api.anthropic.com`).
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key,
            endpoint: format!("{}/v1/messages", base_url.trim_end_matches('/')),
        })
    }

    /// Build the JSON body for one request.
    fn request_body<'a>(
        system_prompt: &'a str,
        user_prompt: &'a str,
        params: &'a CompletionParams,
    ) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &params.model,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            system: system_prompt,
            messages: vec![Message {
                role: "user",
                content: user_prompt,
            }],
        }
    }

    /// Concatenate the text blocks of a reply.
    fn response_text(response: MessagesResponse) -> Result<String> {
        let text: String = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(ReferatError::Backend("Empty response from Anthropic".to_string()));
        }
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

#[async_trait]
impl CompletionBackend for AnthropicBackend {
    fn name(&self) -> &str {
        "anthropic"
    }

    #[instrument(skip_all, fields(model = %params.model))]
    async fn send_completion(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: &CompletionParams,
    ) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(ReferatError::Config(
                "ANTHROPIC_API_KEY not set. Set it with: export ANTHROPIC_API_KEY='sk-ant-...'"
                    .to_string(),
            ));
        }

        let body = Self::request_body(system_prompt, user_prompt, params);

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorResponse>(&raw) {
                Ok(err) => format!("{} ({}): {}", status, err.error.kind, err.error.message),
                Err(_) => format!("{}: {}", status, raw),
            };
            return Err(ReferatError::Backend(format!("Anthropic API error {}", message)));
        }

        let parsed: MessagesResponse = response.json().await?;
        let text = Self::response_text(parsed)?;

        debug!("Anthropic response: {}", text.chars().take(500).collect::<String>());
        Ok(text)
    }
}
