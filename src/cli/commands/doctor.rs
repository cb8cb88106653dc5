//! Doctor command - verify configuration, database and API access.

use crate::cli::commands::config::mask_key;
use crate::cli::Output;
use crate::config::{ModelSettings, Settings};
use crate::store::SqliteStore;
use console::style;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(config_path: Option<PathBuf>, settings: &Settings) -> anyhow::Result<()> {
    Output::header("Referat Doctor");
    println!();
    println!("Checking configuration, database and API access...\n");

    let mut checks = Vec::new();

    println!("{}", style("Configuration").bold());
    let config_path = config_path.unwrap_or_else(Settings::default_config_path);
    let config_check = check_config_file(&config_path);
    config_check.print();
    checks.push(config_check);

    println!();

    println!("{}", style("API Configuration").bold());
    let api_check = check_api_key(&settings.model);
    api_check.print();
    checks.push(api_check);

    println!();

    println!("{}", style("Storage").bold());
    let storage_checks = vec![
        check_data_dir(&settings.data_dir()),
        check_database(settings).await,
    ];
    for check in &storage_checks {
        check.print();
    }
    checks.extend(storage_checks);

    println!();

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Referat.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Referat is ready to use.");
    }

    Ok(())
}

/// Check that the configured provider has an API key.
fn check_api_key(model: &ModelSettings) -> CheckResult {
    let env = model.provider.api_key_env();
    let hint = format!("Set with: export {}='...'", env);
    match model.api_key() {
        Some(key) if key.len() > 20 => CheckResult::ok(
            env,
            &format!("configured for {} ({})", model.provider, mask_key(&key)),
        ),
        Some(_) => CheckResult::warning(env, "set but looks too short", &hint),
        None => CheckResult::error(env, "not set", &hint),
    }
}

fn check_config_file(path: &Path) -> CheckResult {
    if path.exists() {
        CheckResult::ok("Config file", &format!("{}", path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: referat init (or referat config edit)",
        )
    }
}

fn check_data_dir(data_dir: &Path) -> CheckResult {
    if data_dir.exists() {
        CheckResult::ok("Data directory", &format!("{}", data_dir.display()))
    } else {
        CheckResult::warning(
            "Data directory",
            &format!("{} (will be created)", data_dir.display()),
            "Directory will be created on first use",
        )
    }
}

/// Open the database and confirm every table is present.
async fn check_database(settings: &Settings) -> CheckResult {
    let db_path = settings.database_path();
    if !db_path.exists() {
        return CheckResult::warning(
            "Database",
            &format!("{} (not created yet)", db_path.display()),
            "Database will be created by referat init or the first process run",
        );
    }

    let store = match SqliteStore::open(
        &db_path,
        1,
        Duration::from_millis(settings.database.busy_timeout_ms),
    ) {
        Ok(store) => store,
        Err(e) => {
            return CheckResult::error(
                "Database",
                &format!("cannot open {}: {}", db_path.display(), e),
                "Check file permissions or move the broken file aside",
            )
        }
    };

    match store.missing_tables().await {
        Ok(missing) if missing.is_empty() => {
            let size = std::fs::metadata(&db_path)
                .map(|m| format_size(m.len()))
                .unwrap_or_else(|_| "unknown size".to_string());
            CheckResult::ok("Database", &format!("{} ({})", db_path.display(), size))
        }
        Ok(missing) => CheckResult::error(
            "Database",
            &format!("missing tables: {}", missing.join(", ")),
            "Run: referat init",
        ),
        Err(e) => CheckResult::error("Database", &format!("schema check failed: {}", e), "Run: referat init"),
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
