//! Pipeline orchestrator for Referat.
//!
//! Coordinates storing a transcript, extracting its action items and
//! recording them, and exposes the task queries that go straight to the store.

use crate::config::{Prompts, Settings};
use crate::error::{ReferatError, Result};
use crate::extraction::ActionItemExtractor;
use crate::llm::{create_backend, CompletionBackend, CompletionParams};
use crate::model::{ActionItem, Metadata, TaskStatus, Transcript, FILE_UPLOAD_SOURCE};
use crate::store::SqliteStore;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// The main orchestrator for the Referat pipeline.
pub struct Orchestrator {
    settings: Settings,
    extractor: ActionItemExtractor,
    store: Arc<SqliteStore>,
}

impl Orchestrator {
    /// Create an orchestrator from settings: opens the store and builds the
    /// configured model backend.
    ///
    /// Fails if the database cannot be opened or its schema created.
    pub async fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let backend = create_backend(&settings.model)?;

        let store = Arc::new(
            SqliteStore::connect(
                &settings.database_path(),
                settings.database.pool_size,
                Duration::from_millis(settings.database.busy_timeout_ms),
            )
            .await?,
        );

        Ok(Self::with_components(settings, prompts, backend, store))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        backend: Arc<dyn CompletionBackend>,
        store: Arc<SqliteStore>,
    ) -> Self {
        let extractor = ActionItemExtractor::new(backend, CompletionParams::from(&settings.model))
            .with_prompts(prompts);

        Self {
            settings,
            extractor,
            store,
        }
    }

    /// Get a reference to the store.
    pub fn store(&self) -> Arc<SqliteStore> {
        self.store.clone()
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Store a transcript, extract its action items, and record them.
    ///
    /// The transcript is committed before the model is called. Items and the
    /// processed flag are then written together, so a failure after the
    /// first step leaves the transcript stored and unprocessed, ready for
    /// [`reprocess_transcript`](Self::reprocess_transcript).
    ///
    /// Never returns an error: failures are logged and reported through
    /// [`ProcessOutcome::Failed`], whose item list is empty.
    #[instrument(skip(self, transcript), fields(title = %transcript.title))]
    pub async fn process_transcript(&self, transcript: Transcript) -> ProcessOutcome {
        let transcript_id = match self.store.insert_transcript(&transcript).await {
            Ok(id) => id,
            Err(e) => {
                error!("Error storing transcript: {}", e);
                return ProcessOutcome::Failed {
                    transcript_id: None,
                    error: e,
                };
            }
        };

        self.extract_and_record(transcript_id, &transcript).await
    }

    /// Read a transcript file and run it through the pipeline.
    ///
    /// An empty or missing title defaults to "Meeting <date time>".
    #[instrument(skip(self, metadata), fields(path = %path.display()))]
    pub async fn process_new_transcript(
        &self,
        path: &Path,
        title: Option<&str>,
        metadata: Option<Metadata>,
    ) -> ProcessOutcome {
        match Self::transcript_from_file(path, title, metadata).await {
            Ok(transcript) => self.process_transcript(transcript).await,
            Err(e) => {
                error!("Error reading transcript file {:?}: {}", path, e);
                ProcessOutcome::Failed {
                    transcript_id: None,
                    error: e,
                }
            }
        }
    }

    /// Build an unsaved transcript from a file upload.
    pub async fn transcript_from_file(
        path: &Path,
        title: Option<&str>,
        metadata: Option<Metadata>,
    ) -> Result<Transcript> {
        let content = tokio::fs::read_to_string(path).await?;

        let title = match title.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => Transcript::default_title(Utc::now()),
        };

        Ok(Transcript::new(title, content)
            .with_source(FILE_UPLOAD_SOURCE)
            .with_source_file_path(path.to_string_lossy())
            .with_metadata(metadata.unwrap_or_default()))
    }

    /// Retry extraction for a stored transcript that is not yet processed.
    #[instrument(skip(self))]
    pub async fn reprocess_transcript(&self, transcript_id: i64) -> ProcessOutcome {
        let transcript = match self.store.get_transcript(transcript_id).await {
            Ok(Some(t)) => t,
            Ok(None) => {
                return ProcessOutcome::Failed {
                    transcript_id: Some(transcript_id),
                    error: ReferatError::NotFound(format!("transcript {}", transcript_id)),
                };
            }
            Err(e) => {
                error!("Error loading transcript {}: {}", transcript_id, e);
                return ProcessOutcome::Failed {
                    transcript_id: Some(transcript_id),
                    error: e,
                };
            }
        };

        if transcript.processed {
            return ProcessOutcome::Failed {
                transcript_id: Some(transcript_id),
                error: ReferatError::InvalidInput(format!(
                    "Transcript {} is already processed",
                    transcript_id
                )),
            };
        }

        self.extract_and_record(transcript_id, &transcript).await
    }

    /// Retry extraction for every stored transcript that is not yet processed.
    pub async fn reprocess_unprocessed(&self) -> Result<Vec<ProcessOutcome>> {
        let pending = self.store.list_transcripts(Some(false)).await?;
        info!("Reprocessing {} unprocessed transcripts", pending.len());

        let mut outcomes = Vec::with_capacity(pending.len());
        for transcript in pending {
            let Some(id) = transcript.id else { continue };
            outcomes.push(self.extract_and_record(id, &transcript).await);
        }
        Ok(outcomes)
    }

    async fn extract_and_record(&self, transcript_id: i64, transcript: &Transcript) -> ProcessOutcome {
        let metadata = Some(&transcript.metadata);
        let items = match self.extractor.extract_action_items(&transcript.content, metadata).await {
            Ok(items) => items,
            Err(e) => {
                error!("Error extracting action items for transcript {}: {}", transcript_id, e);
                return ProcessOutcome::Failed {
                    transcript_id: Some(transcript_id),
                    error: e.into(),
                };
            }
        };

        match self.store.record_extraction(transcript_id, items).await {
            Ok(stored) => {
                info!(
                    "Processed transcript {}, extracted {} action items",
                    transcript_id,
                    stored.len()
                );
                ProcessOutcome::Processed {
                    transcript_id,
                    action_items: stored,
                }
            }
            Err(e) => {
                error!("Error storing action items for transcript {}: {}", transcript_id, e);
                ProcessOutcome::Failed {
                    transcript_id: Some(transcript_id),
                    error: e,
                }
            }
        }
    }

    /// Pending action items in priority order, optionally for one assignee.
    pub async fn get_pending_tasks(&self, assignee: Option<&str>) -> Result<Vec<ActionItem>> {
        self.store.get_pending_action_items(assignee).await
    }

    /// Mark an action item completed now.
    pub async fn complete_task(&self, task_id: i64) -> Result<()> {
        self.store
            .update_action_item_status(task_id, TaskStatus::Completed, Some(Utc::now()))
            .await
    }

    /// Move an action item to any status; completing stamps the current time.
    pub async fn update_task_status(&self, task_id: i64, status: TaskStatus) -> Result<()> {
        let completed_at = (status == TaskStatus::Completed).then(Utc::now);
        if status == TaskStatus::Cancelled {
            warn!("Cancelling action item {}", task_id);
        }
        self.store.update_action_item_status(task_id, status, completed_at).await
    }

    /// A transcript together with its action items.
    pub async fn transcript_with_items(
        &self,
        transcript_id: i64,
    ) -> Result<(Transcript, Vec<ActionItem>)> {
        let transcript = self
            .store
            .get_transcript(transcript_id)
            .await?
            .ok_or_else(|| ReferatError::NotFound(format!("transcript {}", transcript_id)))?;
        let items = self.store.get_action_items_for_transcript(transcript_id).await?;
        Ok((transcript, items))
    }
}

/// Result of running one transcript through the pipeline.
#[derive(Debug)]
pub enum ProcessOutcome {
    /// Items were extracted (possibly none) and stored; the transcript is processed.
    Processed {
        transcript_id: i64,
        action_items: Vec<ActionItem>,
    },
    /// Something failed. If the transcript was stored, it stays unprocessed.
    Failed {
        transcript_id: Option<i64>,
        error: ReferatError,
    },
}

impl ProcessOutcome {
    /// Stored action items; empty on failure.
    pub fn action_items(&self) -> &[ActionItem] {
        match self {
            ProcessOutcome::Processed { action_items, .. } => action_items,
            ProcessOutcome::Failed { .. } => &[],
        }
    }

    /// Consume the outcome, keeping only the stored items.
    pub fn into_action_items(self) -> Vec<ActionItem> {
        match self {
            ProcessOutcome::Processed { action_items, .. } => action_items,
            ProcessOutcome::Failed { .. } => Vec::new(),
        }
    }

    /// ID of the stored transcript, if it got that far.
    pub fn transcript_id(&self) -> Option<i64> {
        match self {
            ProcessOutcome::Processed { transcript_id, .. } => Some(*transcript_id),
            ProcessOutcome::Failed { transcript_id, .. } => *transcript_id,
        }
    }

    pub fn is_processed(&self) -> bool {
        matches!(self, ProcessOutcome::Processed { .. })
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&ReferatError> {
        match self {
            ProcessOutcome::Processed { .. } => None,
            ProcessOutcome::Failed { error, .. } => Some(error),
        }
    }
}
