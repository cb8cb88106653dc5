//! Fixed-category tags carried by action items.
//!
//! Each tag has one canonical string label. The label is what the model
//! emits, what the database stores, and what the CLI accepts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A string that is not a label of the expected tag.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized {kind} '{value}' (expected one of: {expected})")]
pub struct ParseLabelError {
    /// Which tag was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
    /// Comma-separated accepted labels.
    pub expected: String,
}

macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The canonical string label.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseLabelError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    _ => Err(ParseLabelError {
                        kind: $kind,
                        value: s.to_string(),
                        expected: $name::ALL
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    }),
                }
            }
        }
    };
}

labeled_enum! {
    /// What kind of work an action item is.
    TaskType, "task type" {
        EmailFollowUp => "email_follow_up",
        DocumentCreation => "document_creation",
        MeetingScheduling => "meeting_scheduling",
        Research => "research",
        PhoneCall => "phone_call",
        Reminder => "reminder",
        #[default]
        Other => "other",
    }
}

labeled_enum! {
    /// How soon an action item needs attention.
    ///
    /// Variants are declared from least to most urgent, so the derived
    /// ordering matches priority.
    #[derive(PartialOrd, Ord)]
    UrgencyLevel, "urgency level" {
        Low => "low",
        #[default]
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}

labeled_enum! {
    /// Lifecycle state of an action item.
    TaskStatus, "task status" {
        #[default]
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
        WaitingApproval => "waiting_approval",
    }
}

labeled_enum! {
    /// How much of an action item is meant to run without a human.
    AutomationLevel, "automation level" {
        #[default]
        Manual => "manual",
        SemiAuto => "semi_auto",
        FullAuto => "full_auto",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_parse_back() {
        for task_type in TaskType::ALL {
            assert_eq!(task_type.as_str().parse::<TaskType>().unwrap(), *task_type);
        }
        for status in TaskStatus::ALL {
            assert_eq!(status.to_string().parse::<TaskStatus>().unwrap(), *status);
        }
        assert_eq!("semi_auto".parse::<AutomationLevel>().unwrap(), AutomationLevel::SemiAuto);
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let err = "critical".parse::<UrgencyLevel>().unwrap_err();
        assert_eq!(err.kind, "urgency level");
        assert_eq!(err.value, "critical");
        assert!(err.to_string().contains("low, medium, high, urgent"));

        // Labels are exact, no case folding.
        assert!("High".parse::<UrgencyLevel>().is_err());
    }

    #[test]
    fn test_urgency_ordering() {
        assert!(UrgencyLevel::Urgent > UrgencyLevel::High);
        assert!(UrgencyLevel::High > UrgencyLevel::Medium);
        assert!(UrgencyLevel::Medium > UrgencyLevel::Low);
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&TaskType::EmailFollowUp).unwrap();
        assert_eq!(json, "\"email_follow_up\"");

        let status: TaskStatus = serde_json::from_str("\"waiting_approval\"").unwrap();
        assert_eq!(status, TaskStatus::WaitingApproval);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(TaskType::default(), TaskType::Other);
        assert_eq!(UrgencyLevel::default(), UrgencyLevel::Medium);
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
        assert_eq!(AutomationLevel::default(), AutomationLevel::Manual);
    }
}
