//! OpenAI chat completions backend.

use super::{CompletionBackend, CompletionParams};
use crate::error::{ReferatError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Backend for OpenAI's chat completions API.
pub struct OpenAiBackend {
    client: async_openai::Client<OpenAIConfig>,
}

impl OpenAiBackend {
    /// Create a backend. Without an explicit key the client reads OPENAI_API_KEY.
    ///
    /// `timeout` bounds each HTTP request, not the whole retry loop.
    pub fn new(api_key: Option<&str>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        let config = match api_key {
            Some(key) => OpenAIConfig::new().with_api_key(key),
            None => OpenAIConfig::default(),
        };

        Ok(Self {
            client: async_openai::Client::with_config(config).with_http_client(http_client),
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip_all, fields(model = %params.model))]
    async fn send_completion(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: &CompletionParams,
    ) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()
                .map_err(|e| ReferatError::Backend(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| ReferatError::Backend(e.to_string()))?
                .into(),
        ];

        #[allow(deprecated)]
        let request = CreateChatCompletionRequestArgs::default()
            .model(&params.model)
            .messages(messages)
            .temperature(params.temperature)
            .max_tokens(params.max_tokens)
            .build()
            .map_err(|e| ReferatError::Backend(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            ReferatError::OpenAI(format!("Chat completion failed: {}", e))
        })?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ReferatError::Backend("Empty response from OpenAI".to_string()))?;

        debug!("OpenAI response: {}", content.chars().take(500).collect::<String>());
        Ok(content)
    }
}
