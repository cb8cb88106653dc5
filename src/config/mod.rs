//! Configuration module for Referat.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{ExtractionPrompts, Prompts};
pub use settings::{
    DatabaseSettings, GeneralSettings, ModelProvider, ModelSettings, PromptSettings, Settings,
    TaskSettings,
};
