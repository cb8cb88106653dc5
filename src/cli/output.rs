//! CLI output formatting utilities.

use crate::config::TaskSettings;
use crate::model::{ActionItem, Transcript, UrgencyLevel};
use chrono::{DateTime, Local, Utc};
use console::{style, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print one action item, with review markers when a policy is given.
    pub fn action_item(item: &ActionItem, policy: Option<&TaskSettings>) {
        let id = item
            .id
            .map(|id| format!("#{}", id))
            .unwrap_or_else(|| "#-".to_string());
        let assignee = if item.assignee.is_empty() {
            "unassigned"
        } else {
            item.assignee.as_str()
        };

        println!(
            "  {} {} {} {}",
            style(id).dim(),
            urgency_badge(item.urgency_level),
            style(assignee).bold(),
            item.description
        );

        let mut details = vec![
            item.task_type.to_string(),
            item.status.to_string(),
            format!("confidence {:.2}", item.confidence_score),
        ];
        if let Some(deadline) = item.estimated_deadline {
            details.push(format!("due {}", format_time(deadline)));
        }
        if let Some(policy) = policy {
            if policy.requires_human_review(item) {
                details.push("needs review".to_string());
            } else if policy.is_auto_executable(item) {
                details.push("auto-eligible".to_string());
            }
        }
        println!("      {}", style(details.join(" | ")).dim());
    }

    /// Print a one-line transcript summary.
    pub fn transcript_info(transcript: &Transcript) {
        let marker = if transcript.processed {
            style("*").cyan()
        } else {
            style("!").yellow()
        };
        println!(
            "  {} {} {} ({})",
            marker,
            style(format!("#{}", transcript.id.unwrap_or_default())).dim(),
            style(&transcript.title).bold(),
            format_time(transcript.date)
        );
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

fn urgency_badge(urgency: UrgencyLevel) -> StyledObject<String> {
    let label = format!("[{}]", urgency);
    match urgency {
        UrgencyLevel::Urgent => style(label).red().bold(),
        UrgencyLevel::High => style(label).yellow(),
        UrgencyLevel::Medium => style(label).cyan(),
        UrgencyLevel::Low => style(label).dim(),
    }
}

/// Local wall-clock rendering of a stored timestamp.
pub fn format_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Truncate content with ellipsis.
pub fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        format!("{}...", content.chars().take(max_chars).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_preview() {
        assert_eq!(content_preview("short", 10), "short");
        assert_eq!(content_preview("line one\nline two", 8), "line one...");
        assert_eq!(content_preview("blåbærsyltetøy", 5), "blåbæ...");
    }
}
