//! Init command - interactive first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use crate::store::SqliteStore;
use console::style;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

/// Run the init command for first-time setup.
pub async fn run_init(config_path: Option<PathBuf>, settings: &Settings) -> anyhow::Result<()> {
    Output::header("Referat Setup");
    println!();
    println!("Welcome to Referat! Let's make sure everything is configured correctly.\n");

    // Step 1: Check API key
    println!("{}", style("Step 1: Checking API configuration").bold().cyan());
    println!();

    let provider = settings.model.provider;
    let env = provider.api_key_env();
    if settings.model.api_key().is_none() {
        Output::warning(&format!("{} is not set.", env));
        println!();
        println!(
            "  Referat sends transcripts to the {} API to extract action items.",
            provider
        );
        println!("  Get your API key from: {}", style(key_url(env)).underlined());
        println!();
        println!("  Set it in your shell configuration (~/.bashrc, ~/.zshrc, etc.):");
        println!("  {}", style(format!("export {}='...'", env)).green());
        println!();

        if !prompt_continue("Continue without API key?")? {
            println!();
            Output::info("Setup cancelled. Set your API key and run 'referat init' again.");
            return Ok(());
        }
    } else {
        Output::success(&format!("{} API key is configured!", provider));
    }

    println!();

    // Step 2: Create data directory
    println!("{}", style("Step 2: Setting up directories").bold().cyan());
    println!();

    let data_dir = settings.data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        Output::success(&format!("Created data directory: {}", data_dir.display()));
    } else {
        Output::info(&format!("Data directory exists: {}", data_dir.display()));
    }

    println!();

    // Step 3: Create config file
    println!("{}", style("Step 3: Configuration file").bold().cyan());
    println!();

    let config_path = config_path.unwrap_or_else(Settings::default_config_path);
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
        println!();
        println!("  Edit your config with: {}", style("referat config edit").green());
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();

    // Step 4: Database
    println!("{}", style("Step 4: Database").bold().cyan());
    println!();

    let db_path = settings.database_path();
    SqliteStore::connect(
        &db_path,
        settings.database.pool_size,
        Duration::from_millis(settings.database.busy_timeout_ms),
    )
    .await?;
    Output::success(&format!("Database ready: {}", db_path.display()));

    println!();

    // Summary
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check system status", style("referat doctor").cyan());
    println!("  {} Extract action items from a meeting", style("referat process <file>").cyan());
    println!("  {} See what is still open", style("referat pending").cyan());
    println!();
    println!("For more help: {}", style("referat --help").cyan());

    Ok(())
}

/// Where to get a key for the given environment variable.
fn key_url(env: &str) -> &'static str {
    match env {
        "ANTHROPIC_API_KEY" => "https://console.anthropic.com/settings/keys",
        _ => "https://platform.openai.com/api-keys",
    }
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let answer = input.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_url() {
        assert!(key_url("ANTHROPIC_API_KEY").contains("anthropic"));
        assert!(key_url("OPENAI_API_KEY").contains("openai"));
    }
}
