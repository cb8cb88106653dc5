//! Meeting transcript record.

use super::Metadata;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source label for transcripts read from a local file.
pub const FILE_UPLOAD_SOURCE: &str = "file_upload";

/// A stored meeting transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Database ID (assigned on insert).
    pub id: Option<i64>,
    /// Meeting title.
    pub title: String,
    /// When the meeting took place.
    pub date: DateTime<Utc>,
    /// Participant names, in the order given.
    pub participants: Vec<String>,
    /// Full transcript text.
    pub content: String,
    /// Capture tool the transcript came from (google_meet, tactiq, file_upload, ...).
    pub source: String,
    /// File the transcript was read from, if any.
    pub source_file_path: Option<String>,
    /// Free-form metadata passed along to the model.
    pub metadata: Metadata,
    /// Set once the transcript's action items have been stored.
    pub processed: bool,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl Transcript {
    /// Create an unsaved transcript dated now.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            title: title.into(),
            date: now,
            participants: Vec::new(),
            content: content.into(),
            source: String::new(),
            source_file_path: None,
            metadata: Metadata::new(),
            processed: false,
            created_at: now,
        }
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    pub fn with_participants(mut self, participants: Vec<String>) -> Self {
        self.participants = participants;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_source_file_path(mut self, path: impl Into<String>) -> Self {
        self.source_file_path = Some(path.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Default title for a transcript that arrived without one.
    pub fn default_title(at: DateTime<Utc>) -> String {
        format!("Meeting {}", at.format("%Y-%m-%d %H:%M"))
    }
}
