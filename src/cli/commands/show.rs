//! Show command - one transcript and its action items.

use crate::cli::output::{content_preview, format_time};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the show command.
pub async fn run_show(transcript_id: i64, settings: Settings) -> Result<()> {
    let policy = settings.tasks.clone();
    let orchestrator = Orchestrator::new(settings).await?;

    let (transcript, items) = orchestrator.transcript_with_items(transcript_id).await?;

    Output::header(&transcript.title);
    println!();
    Output::kv("ID", &transcript_id.to_string());
    Output::kv("Date", &format_time(transcript.date));
    if !transcript.participants.is_empty() {
        Output::kv("Participants", &transcript.participants.join(", "));
    }
    Output::kv("Source", &transcript.source);
    if let Some(path) = &transcript.source_file_path {
        Output::kv("File", path);
    }
    Output::kv("Processed", if transcript.processed { "yes" } else { "no" });
    for (key, value) in &transcript.metadata {
        let value = value
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string());
        Output::kv(key, &value);
    }
    println!();
    println!("  {}", content_preview(&transcript.content, 300));

    Output::header(&format!("Action Items ({})", items.len()));
    println!();
    if items.is_empty() && !transcript.processed {
        Output::info(&format!(
            "Not processed yet. Run: referat reprocess {}",
            transcript_id
        ));
    }
    for item in &items {
        Output::action_item(item, Some(&policy));
    }

    Ok(())
}
