//! Pending command - list open action items.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the pending command.
pub async fn run_pending(assignee: Option<&str>, settings: Settings) -> Result<()> {
    let policy = settings.tasks.clone();
    let orchestrator = Orchestrator::new(settings).await?;

    let tasks = orchestrator.get_pending_tasks(assignee).await?;
    if tasks.is_empty() {
        match assignee {
            Some(name) => Output::info(&format!("No pending action items for {}.", name)),
            None => Output::info("No pending action items."),
        }
        return Ok(());
    }

    let heading = match assignee {
        Some(name) => format!("Pending for {} ({})", name, tasks.len()),
        None => format!("Pending Action Items ({})", tasks.len()),
    };
    Output::header(&heading);
    println!();

    for task in &tasks {
        Output::action_item(task, Some(&policy));
    }

    let review = tasks.iter().filter(|t| policy.requires_human_review(t)).count();
    let auto = tasks.iter().filter(|t| policy.is_auto_executable(t)).count();
    println!();
    Output::kv("Needs review", &review.to_string());
    Output::kv("Auto-eligible", &auto.to_string());

    Ok(())
}
