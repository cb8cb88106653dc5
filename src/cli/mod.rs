//! CLI module for Referat.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::model::TaskStatus;
use clap::{Parser, Subcommand};

/// Referat - Meeting Transcripts to Action Items
///
/// Feeds meeting transcripts to a language model, stores the action items it
/// finds, and keeps track of them until they are done.
/// The name "Referat" is the Norwegian word for the minutes of a meeting.
#[derive(Parser, Debug)]
#[command(name = "referat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Referat: data directory, config file and database
    Init,

    /// Check configuration, database and API key
    Doctor,

    /// Extract action items from a transcript file
    Process {
        /// Path to a plain-text transcript
        file: String,

        /// Meeting title (defaults to "Meeting <date time>")
        #[arg(short, long)]
        title: Option<String>,

        /// Extra meeting metadata as key=value (repeatable)
        #[arg(short, long = "meta", value_name = "KEY=VALUE")]
        meta: Vec<String>,

        /// Meeting participant (repeatable)
        #[arg(short, long = "participant", value_name = "NAME")]
        participant: Vec<String>,
    },

    /// List pending action items, most urgent first
    Pending {
        /// Only show items assigned to this person
        #[arg(short, long)]
        assignee: Option<String>,
    },

    /// Mark an action item as completed
    Complete {
        /// Action item ID
        id: i64,
    },

    /// Set the status of an action item
    Status {
        /// Action item ID
        id: i64,

        /// New status (pending, in_progress, completed, cancelled, waiting_approval)
        status: TaskStatus,
    },

    /// Show a transcript and its action items
    Show {
        /// Transcript ID
        transcript_id: i64,
    },

    /// List stored transcripts
    List {
        /// Only show transcripts whose extraction has not succeeded
        #[arg(short, long)]
        unprocessed: bool,
    },

    /// Retry extraction for unprocessed transcripts
    Reprocess {
        /// Transcript ID (all unprocessed transcripts if omitted)
        transcript_id: Option<i64>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
