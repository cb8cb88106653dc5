//! Referat - Meeting Transcripts to Action Items
//!
//! Ingests meeting transcripts, asks a language model to pull out the action
//! items, and keeps both in a local SQLite database for follow-up.
//!
//! "Referat" is the Norwegian word for the minutes of a meeting.
//!
//! # Architecture
//!
//! - `model` - Transcript and action item records
//! - `store` - SQLite persistence behind a small connection pool
//! - `llm` - Model backends (OpenAI, Anthropic) behind one trait
//! - `extraction` - Prompting the model and parsing its action items
//! - `orchestrator` - Pipeline coordination and task queries
//! - `config` - Settings and prompt templates
//!
//! # Example
//!
//! ```rust,no_run
//! use referat::config::Settings;
//! use referat::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings).await?;
//!
//!     let outcome = orchestrator
//!         .process_new_transcript("weekly-sync.txt".as_ref(), None, None)
//!         .await;
//!     println!("Extracted {} action items", outcome.action_items().len());
//!
//!     for task in orchestrator.get_pending_tasks(Some("John")).await? {
//!         println!("[{}] {}", task.urgency_level, task.description);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod llm;
pub mod model;
pub mod orchestrator;
pub mod store;

pub use error::{ReferatError, Result};
