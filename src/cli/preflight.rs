//! Pre-flight checks before model calls.
//!
//! Validates that the configured provider has an API key before a command
//! stores a transcript and then fails halfway at the model call.

use crate::config::ModelSettings;
use crate::error::{ReferatError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Extraction needs the configured provider's API key.
    Extract,
    /// Task queries only touch the database.
    Query,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, model: &ModelSettings) -> Result<()> {
    match operation {
        Operation::Extract => check_api_key(model),
        Operation::Query => Ok(()),
    }
}

/// Check that the configured provider has an API key.
fn check_api_key(model: &ModelSettings) -> Result<()> {
    let env = model.provider.api_key_env();
    match model.api_key() {
        Some(key) if !key.is_empty() => Ok(()),
        _ => Err(ReferatError::Config(format!(
            "{} not set. Set it with: export {}='...' or add it to the [model] section of the config file",
            env, env
        ))),
    }
}
