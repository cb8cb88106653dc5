//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(unprocessed: bool, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings).await?;

    let filter = if unprocessed { Some(false) } else { None };
    let transcripts = match orchestrator.store().list_transcripts(filter).await {
        Ok(t) => t,
        Err(e) => {
            Output::error(&format!("Failed to list transcripts: {}", e));
            return Err(e.into());
        }
    };

    if transcripts.is_empty() {
        if unprocessed {
            Output::info("Every stored transcript has been processed.");
        } else {
            Output::info("No transcripts yet. Use 'referat process <file>' to add one.");
        }
        return Ok(());
    }

    Output::header(&format!("Transcripts ({})", transcripts.len()));
    println!();
    for transcript in &transcripts {
        Output::transcript_info(transcript);
    }

    let pending = transcripts.iter().filter(|t| !t.processed).count();
    println!();
    Output::kv("Total", &transcripts.len().to_string());
    Output::kv("Unprocessed", &pending.to_string());

    Ok(())
}
