//! Data model for transcripts and the action items extracted from them.

mod action_item;
mod labels;
mod transcript;

pub use action_item::ActionItem;
pub use labels::{AutomationLevel, ParseLabelError, TaskStatus, TaskType, UrgencyLevel};
pub use transcript::{Transcript, FILE_UPLOAD_SOURCE};

/// Free-form key/value map (transcript metadata, item context and entities).
///
/// Stored as a JSON object; nothing in the crate depends on specific keys.
pub type Metadata = serde_json::Map<String, serde_json::Value>;
