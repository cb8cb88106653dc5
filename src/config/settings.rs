//! Configuration settings for Referat.

use crate::error::{ReferatError, Result};
use crate::model::ActionItem;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub database: DatabaseSettings,
    pub model: ModelSettings,
    pub tasks: TaskSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level when no -v flag is given (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.referat".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Path to the SQLite database file.
    pub path: String,
    /// Number of pooled connections.
    pub pool_size: usize,
    /// How long a connection waits on a locked database, in milliseconds.
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "~/.referat/referat.db".to_string(),
            pool_size: 4,
            busy_timeout_ms: 5000,
        }
    }
}

/// Language model provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    /// OpenAI chat completions (default).
    #[default]
    OpenAI,
    /// Anthropic Messages API.
    Anthropic,
}

impl ModelProvider {
    /// Environment variable holding this provider's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ModelProvider::OpenAI => "OPENAI_API_KEY",
            ModelProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl std::str::FromStr for ModelProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ModelProvider::OpenAI),
            "anthropic" | "claude" => Ok(ModelProvider::Anthropic),
            _ => Err(format!("Unknown model provider: {}", s)),
        }
    }
}

impl std::fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelProvider::OpenAI => write!(f, "openai"),
            ModelProvider::Anthropic => write!(f, "anthropic"),
        }
    }
}

/// Language model settings for action item extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Which backend protocol to speak.
    pub provider: ModelProvider,
    /// Model identifier sent to the provider.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum output tokens.
    pub max_tokens: u32,
    /// OpenAI API key (falls back to OPENAI_API_KEY).
    pub openai_api_key: Option<String>,
    /// Anthropic API key (falls back to ANTHROPIC_API_KEY).
    pub anthropic_api_key: Option<String>,
    /// Base URL of the Anthropic API.
    pub anthropic_base_url: String,
    /// HTTP client timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: ModelProvider::OpenAI,
            model: "gpt-4".to_string(),
            temperature: 0.3,
            max_tokens: 1000,
            openai_api_key: None,
            anthropic_api_key: None,
            anthropic_base_url: "https://api.anthropic.com".to_string(),
            request_timeout_secs: 300,
        }
    }
}

impl ModelSettings {
    /// API key for the configured provider, from settings or the environment.
    pub fn api_key(&self) -> Option<String> {
        let configured = match self.provider {
            ModelProvider::OpenAI => self.openai_api_key.clone(),
            ModelProvider::Anthropic => self.anthropic_api_key.clone(),
        };

        configured
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(self.provider.api_key_env()).ok())
            .filter(|k| !k.is_empty())
    }
}

/// Task handling policy values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskSettings {
    /// Minimum confidence for an item to be considered for automatic execution.
    pub auto_execute_threshold: f64,
    /// Categories that always need a human to sign off.
    pub human_review_required: Vec<String>,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            auto_execute_threshold: 0.85,
            human_review_required: vec![
                "legal_documents".to_string(),
                "high_value_contracts".to_string(),
                "external_communications".to_string(),
            ],
        }
    }
}

impl TaskSettings {
    /// Whether an item falls in a category that always needs human sign-off.
    ///
    /// Matches the item's task type label or its `entities.category` value.
    pub fn requires_human_review(&self, item: &ActionItem) -> bool {
        let category = item.entities.get("category").and_then(|v| v.as_str());
        self.human_review_required
            .iter()
            .any(|c| c == item.task_type.as_str() || Some(c.as_str()) == category)
    }

    /// Whether an item is confident enough, and safe enough, to run unattended.
    pub fn is_auto_executable(&self, item: &ActionItem) -> bool {
        item.confidence_score >= self.auto_execute_threshold && !self.requires_human_review(item)
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ReferatError::Config(format!(
                "model.temperature must be between 0 and 2, got {}",
                self.model.temperature
            )));
        }
        if self.model.max_tokens == 0 {
            return Err(ReferatError::Config("model.max_tokens must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.tasks.auto_execute_threshold) {
            return Err(ReferatError::Config(format!(
                "tasks.auto_execute_threshold must be between 0 and 1, got {}",
                self.tasks.auto_execute_threshold
            )));
        }
        if self.database.pool_size == 0 {
            return Err(ReferatError::Config("database.pool_size must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| ReferatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("referat")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn database_path(&self) -> PathBuf {
        Self::expand_path(&self.database.path)
    }
}
