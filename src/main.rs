//! Referat CLI entry point.

use anyhow::Result;
use clap::Parser;
use referat::cli::{commands, Cli, Commands};
use referat::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("referat={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Execute command
    match &cli.command {
        Commands::Init => {
            commands::run_init(config_path, &settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(config_path, &settings).await?;
        }

        Commands::Process {
            file,
            title,
            meta,
            participant,
        } => {
            commands::run_process(file, title.as_deref(), meta, participant, settings).await?;
        }

        Commands::Pending { assignee } => {
            commands::run_pending(assignee.as_deref(), settings).await?;
        }

        Commands::Complete { id } => {
            commands::run_complete(*id, settings).await?;
        }

        Commands::Status { id, status } => {
            commands::run_status(*id, *status, settings).await?;
        }

        Commands::Show { transcript_id } => {
            commands::run_show(*transcript_id, settings).await?;
        }

        Commands::List { unprocessed } => {
            commands::run_list(*unprocessed, settings).await?;
        }

        Commands::Reprocess { transcript_id } => {
            commands::run_reprocess(*transcript_id, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
