//! Action item record.

use super::{AutomationLevel, Metadata, TaskStatus, TaskType, UrgencyLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single task extracted from a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    /// Database ID (assigned on insert).
    pub id: Option<i64>,
    /// Owning transcript. Must be set before the item can be stored.
    pub transcript_id: Option<i64>,
    /// Who is responsible.
    pub assignee: String,
    /// What needs to be done.
    pub description: String,
    pub task_type: TaskType,
    pub urgency_level: UrgencyLevel,
    /// Deadline estimated at extraction time.
    pub estimated_deadline: Option<DateTime<Utc>>,
    /// Deadline confirmed later, if any.
    pub actual_deadline: Option<DateTime<Utc>>,
    pub status: TaskStatus,
    pub automation_level: AutomationLevel,
    /// Meeting context around the item.
    pub context: Metadata,
    /// People, companies, documents and dates mentioned.
    pub entities: Metadata,
    /// Model confidence in [0.0, 1.0].
    pub confidence_score: f64,
    pub created_at: DateTime<Utc>,
    /// Set only when the item moves to completed.
    pub completed_at: Option<DateTime<Utc>>,
}

impl ActionItem {
    /// Create a pending, manual, unattached action item.
    pub fn new(assignee: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            transcript_id: None,
            assignee: assignee.into(),
            description: description.into(),
            task_type: TaskType::default(),
            urgency_level: UrgencyLevel::default(),
            estimated_deadline: None,
            actual_deadline: None,
            status: TaskStatus::default(),
            automation_level: AutomationLevel::default(),
            context: Metadata::new(),
            entities: Metadata::new(),
            confidence_score: 0.0,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn with_task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = task_type;
        self
    }

    pub fn with_urgency(mut self, urgency_level: UrgencyLevel) -> Self {
        self.urgency_level = urgency_level;
        self
    }

    pub fn with_estimated_deadline(mut self, deadline: Option<DateTime<Utc>>) -> Self {
        self.estimated_deadline = deadline;
        self
    }

    pub fn with_confidence(mut self, confidence_score: f64) -> Self {
        self.confidence_score = confidence_score;
        self
    }

    /// Attach the item to its transcript.
    pub fn for_transcript(mut self, transcript_id: i64) -> Self {
        self.transcript_id = Some(transcript_id);
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }
}
