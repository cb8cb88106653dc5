//! Complete and status commands - action item status transitions.

use crate::cli::Output;
use crate::config::Settings;
use crate::model::TaskStatus;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the complete command.
pub async fn run_complete(id: i64, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings).await?;
    orchestrator.complete_task(id).await?;
    Output::success(&format!("Action item #{} completed.", id));
    Ok(())
}

/// Run the status command.
pub async fn run_status(id: i64, status: TaskStatus, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings).await?;
    orchestrator.update_task_status(id, status).await?;
    Output::success(&format!("Action item #{} is now {}.", id, status));
    Ok(())
}
