//! Action item extraction.
//!
//! Builds the extraction prompt from a transcript, sends it to the
//! configured model backend once, and parses the reply. Failures come back
//! as [`ExtractionError`] so that "the model found nothing" (`Ok(vec![])`)
//! and "the call broke" stay distinguishable.

mod parse;

pub use parse::parse_action_items;

use crate::config::Prompts;
use crate::llm::{CompletionBackend, CompletionParams};
use crate::model::{ActionItem, Metadata, ParseLabelError};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Why an extraction produced no usable result.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The model call itself failed (network, auth, empty reply).
    #[error("{backend} backend failed: {message}")]
    Backend { backend: String, message: String },

    /// The reply was not a JSON array of action item objects.
    #[error("model response is not a JSON array of action items: {0}")]
    MalformedResponse(String),

    /// A task type or urgency level outside the fixed set.
    #[error(transparent)]
    UnknownLabel(#[from] ParseLabelError),

    /// A field had the wrong shape.
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Turns transcript text into candidate action items via a language model.
pub struct ActionItemExtractor {
    backend: Arc<dyn CompletionBackend>,
    params: CompletionParams,
    prompts: Prompts,
}

impl ActionItemExtractor {
    pub fn new(backend: Arc<dyn CompletionBackend>, params: CompletionParams) -> Self {
        Self {
            backend,
            params,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Name of the backend in use.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// System and user prompt for one transcript.
    pub fn build_prompts(&self, text: &str, metadata: Option<&Metadata>) -> (String, String) {
        let metadata_json = match metadata {
            Some(m) => serde_json::to_string_pretty(m).unwrap_or_else(|_| "{}".to_string()),
            None => "{}".to_string(),
        };

        let mut vars = HashMap::new();
        vars.insert("transcript".to_string(), text.to_string());
        vars.insert("metadata".to_string(), metadata_json);

        let system = self.prompts.render_with_custom(&self.prompts.extraction.system, &vars);
        let user = self.prompts.render_with_custom(&self.prompts.extraction.user, &vars);
        (system, user)
    }

    /// Ask the model for the action items in `text`.
    ///
    /// Returned items are pending and not yet attached to a transcript.
    #[instrument(skip_all, fields(backend = %self.backend.name(), chars = text.len()))]
    pub async fn extract_action_items(
        &self,
        text: &str,
        metadata: Option<&Metadata>,
    ) -> Result<Vec<ActionItem>, ExtractionError> {
        let (system_prompt, user_prompt) = self.build_prompts(text, metadata);

        let response = self
            .backend
            .send_completion(&system_prompt, &user_prompt, &self.params)
            .await
            .map_err(|e| ExtractionError::Backend {
                backend: self.backend.name().to_string(),
                message: e.to_string(),
            })?;

        debug!("Extraction response: {}", response.chars().take(500).collect::<String>());

        let items = parse_action_items(&response, Utc::now())?;
        info!("Model returned {} action items", items.len());
        Ok(items)
    }
}
