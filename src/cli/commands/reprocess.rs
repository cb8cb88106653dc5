//! Reprocess command - retry extraction for unprocessed transcripts.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{Orchestrator, ProcessOutcome};
use anyhow::{bail, Result};

/// Run the reprocess command.
pub async fn run_reprocess(transcript_id: Option<i64>, settings: Settings) -> Result<()> {
    preflight::check(Operation::Extract, &settings.model)?;
    let orchestrator = Orchestrator::new(settings).await?;

    let spinner = Output::spinner("Extracting action items...");
    let outcomes = match transcript_id {
        Some(id) => vec![orchestrator.reprocess_transcript(id).await],
        None => orchestrator.reprocess_unprocessed().await?,
    };
    spinner.finish_and_clear();

    if outcomes.is_empty() {
        Output::info("No unprocessed transcripts.");
        return Ok(());
    }

    let mut failures = 0;
    for outcome in &outcomes {
        report(outcome);
        if !outcome.is_processed() {
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{} of {} transcripts failed", failures, outcomes.len());
    }
    Ok(())
}

fn report(outcome: &ProcessOutcome) {
    let id = outcome
        .transcript_id()
        .map(|id| format!("#{}", id))
        .unwrap_or_else(|| "?".to_string());
    match outcome.error() {
        None => Output::success(&format!(
            "Transcript {}: {} action items",
            id,
            outcome.action_items().len()
        )),
        Some(e) => Output::error(&format!("Transcript {}: {}", id, e)),
    }
}
