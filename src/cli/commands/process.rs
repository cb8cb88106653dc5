//! Process command - run one transcript file through the pipeline.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::model::Metadata;
use crate::orchestrator::{Orchestrator, ProcessOutcome};
use anyhow::{bail, Result};
use serde_json::Value;
use std::path::Path;

/// Run the process command.
pub async fn run_process(
    file: &str,
    title: Option<&str>,
    meta: &[String],
    participants: &[String],
    settings: Settings,
) -> Result<()> {
    preflight::check(Operation::Extract, &settings.model)?;

    let path = Path::new(file);
    if !path.is_file() {
        bail!("Transcript file not found: {}", file);
    }

    let metadata = parse_meta(meta)?;
    let policy = settings.tasks.clone();
    let orchestrator = Orchestrator::new(settings).await?;

    let transcript = Orchestrator::transcript_from_file(path, title, Some(metadata))
        .await?
        .with_participants(participants.to_vec());
    Output::info(&format!("Processing '{}'", transcript.title));

    let spinner = Output::spinner("Extracting action items...");
    let outcome = orchestrator.process_transcript(transcript).await;
    spinner.finish_and_clear();

    match outcome {
        ProcessOutcome::Processed {
            transcript_id,
            action_items,
        } => {
            if action_items.is_empty() {
                Output::success(&format!(
                    "Transcript #{} processed, no action items found.",
                    transcript_id
                ));
            } else {
                Output::header(&format!("Action Items ({})", action_items.len()));
                println!();
                for item in &action_items {
                    Output::action_item(item, Some(&policy));
                }
                println!();
                Output::success(&format!("Stored with transcript #{}", transcript_id));
            }
            Ok(())
        }
        ProcessOutcome::Failed {
            transcript_id,
            error,
        } => {
            Output::error(&format!("Extraction failed: {}", error));
            if let Some(id) = transcript_id {
                Output::info(&format!(
                    "Transcript saved as #{}. Retry with: referat reprocess {}",
                    id, id
                ));
            }
            Err(error.into())
        }
    }
}

/// Turn `key=value` pairs into a metadata map with string values.
fn parse_meta(pairs: &[String]) -> Result<Metadata> {
    let mut metadata = Metadata::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid --meta '{}', expected key=value", pair);
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("Invalid --meta '{}', key is empty", pair);
        }
        metadata.insert(key.to_string(), Value::String(value.trim().to_string()));
    }
    Ok(metadata)
}
