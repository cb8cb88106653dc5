//! Language model backends.
//!
//! Each provider speaks its own request/response shape; callers only see
//! [`CompletionBackend`]. The provider is picked from configuration, never
//! from the model name.

mod anthropic;
mod openai;

pub use anthropic::AnthropicBackend;
pub use openai::OpenAiBackend;

use crate::config::{ModelProvider, ModelSettings};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Per-request generation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum output tokens.
    pub max_tokens: u32,
}

impl From<&ModelSettings> for CompletionParams {
    fn from(settings: &ModelSettings) -> Self {
        Self {
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }
}

/// A model provider that turns a system and user prompt into text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Short provider name for logs and errors.
    fn name(&self) -> &str;

    /// Send one completion request and return the model's text reply.
    async fn send_completion(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: &CompletionParams,
    ) -> Result<String>;
}

/// Build the backend selected by the settings.
pub fn create_backend(settings: &ModelSettings) -> Result<Arc<dyn CompletionBackend>> {
    let timeout = Duration::from_secs(settings.request_timeout_secs);
    let api_key = settings.api_key();

    info!("Using {} backend with model {}", settings.provider, settings.model);

    let backend: Arc<dyn CompletionBackend> = match settings.provider {
        ModelProvider::OpenAI => Arc::new(OpenAiBackend::new(api_key.as_deref(), timeout)?),
        ModelProvider::Anthropic => Arc::new(AnthropicBackend::new(
            api_key.unwrap_or_default(),
            &settings.anthropic_base_url,
            timeout,
        )?),
    };

    Ok(backend)
}

/// Backends for tests that never touch the network.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::error::ReferatError;
    use std::sync::Mutex;

    /// Replies with a fixed string and records the prompts it was given.
    pub struct StaticBackend {
        reply: String,
        pub calls: Mutex<Vec<(String, String, CompletionParams)>>,
    }

    impl StaticBackend {
        pub fn new(reply: impl Into<String>) -> Self {
            Self {
                reply: reply.into(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionBackend for StaticBackend {
        fn name(&self) -> &str {
            "static"
        }

        async fn send_completion(
            &self,
            system_prompt: &str,
            user_prompt: &str,
            params: &CompletionParams,
        ) -> Result<String> {
            self.calls.lock().unwrap().push((
                system_prompt.to_string(),
                user_prompt.to_string(),
                params.clone(),
            ));
            Ok(self.reply.clone())
        }
    }

    /// Fails every request.
    pub struct FailingBackend;

    #[async_trait]
    impl CompletionBackend for FailingBackend {
        fn name(&self) -> &str {
            "failing"
        }

        async fn send_completion(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
            _params: &CompletionParams,
        ) -> Result<String> {
            Err(ReferatError::Backend("connection refused".to_string()))
        }
    }
}
