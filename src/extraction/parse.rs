//! Parsing model replies into action items.

use super::ExtractionError;
use crate::model::{ActionItem, Metadata, TaskType, UrgencyLevel};
use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// One element of the JSON array the model is asked for.
#[derive(Debug, Deserialize)]
struct RawActionItem {
    #[serde(default)]
    assignee: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    task_type: Option<String>,
    #[serde(default)]
    urgency_level: Option<String>,
    #[serde(default)]
    entities: Value,
    #[serde(default)]
    context: Value,
    #[serde(default)]
    estimated_days_to_complete: Value,
    #[serde(default)]
    confidence_score: Option<f64>,
}

/// Latest year a deadline may fall in. Later years do not fit the
/// four-digit RFC 3339 form they are stored in.
const MAX_DEADLINE_YEAR: i32 = 9999;

/// Parse a model reply into unattached, pending action items.
///
/// Relative deadlines are resolved against `now`.
pub fn parse_action_items(
    response: &str,
    now: DateTime<Utc>,
) -> Result<Vec<ActionItem>, ExtractionError> {
    json_array(response)?
        .into_iter()
        .map(|raw| convert(raw, now))
        .collect()
}

/// The action item array inside a reply that may be wrapped in prose or fences.
///
/// Tries each `[` in turn and takes the first array of objects that parses,
/// preferring a non-empty one, so bracketed prose before the real array is
/// skipped.
fn json_array(response: &str) -> Result<Vec<RawActionItem>, ExtractionError> {
    let mut empty_found = false;

    for (start, _) in response.match_indices('[') {
        let mut stream =
            serde_json::Deserializer::from_str(&response[start..]).into_iter::<Vec<RawActionItem>>();
        match stream.next() {
            Some(Ok(items)) if !items.is_empty() => return Ok(items),
            Some(Ok(_)) => empty_found = true,
            _ => {}
        }
    }

    if empty_found {
        return Ok(Vec::new());
    }

    let reason = match serde_json::from_str::<Vec<RawActionItem>>(response.trim()) {
        Ok(items) => return Ok(items),
        Err(e) => e.to_string(),
    };
    Err(ExtractionError::MalformedResponse(format!(
        "{}. Response was: {}",
        reason,
        response.chars().take(500).collect::<String>()
    )))
}

fn convert(raw: RawActionItem, now: DateTime<Utc>) -> Result<ActionItem, ExtractionError> {
    let task_type = match raw.task_type.as_deref() {
        Some(label) => label.parse::<TaskType>()?,
        None => TaskType::Other,
    };
    let urgency_level = match raw.urgency_level.as_deref() {
        Some(label) => label.parse::<UrgencyLevel>()?,
        None => UrgencyLevel::Medium,
    };

    let mut item = ActionItem::new(
        raw.assignee.unwrap_or_default(),
        raw.description.unwrap_or_default(),
    )
    .with_task_type(task_type)
    .with_urgency(urgency_level)
    .with_estimated_deadline(deadline(&raw.estimated_days_to_complete, now)?)
    .with_confidence(confidence(raw.confidence_score));

    item.context = into_map("context", raw.context)?;
    item.entities = into_map("entities", raw.entities)?;
    item.created_at = now;

    Ok(item)
}

fn deadline(days: &Value, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>, ExtractionError> {
    match days {
        Value::Null => Ok(None),
        Value::Number(n) => {
            let days = n.as_f64().ok_or_else(|| ExtractionError::InvalidField {
                field: "estimated_days_to_complete",
                reason: format!("{} is not representable", n),
            })?;
            let millis = (days * 86_400_000.0).round() as i64;
            let offset = Duration::try_milliseconds(millis).ok_or_else(|| {
                ExtractionError::InvalidField {
                    field: "estimated_days_to_complete",
                    reason: format!("{} days is out of range", days),
                }
            })?;
            now.checked_add_signed(offset)
                .filter(|at| (0..=MAX_DEADLINE_YEAR).contains(&at.year()))
                .map(Some)
                .ok_or_else(|| ExtractionError::InvalidField {
                    field: "estimated_days_to_complete",
                    reason: format!("{} days is out of range", days),
                })
        }
        other => Err(ExtractionError::InvalidField {
            field: "estimated_days_to_complete",
            reason: format!("expected a number, got {}", other),
        }),
    }
}

fn confidence(score: Option<f64>) -> f64 {
    match score {
        Some(s) if (0.0..=1.0).contains(&s) => s,
        Some(s) if s.is_nan() => 0.0,
        Some(s) => {
            warn!("Clamping confidence score {} into [0, 1]", s);
            s.clamp(0.0, 1.0)
        }
        None => 0.0,
    }
}

/// Objects are kept as-is, a bare string becomes `{"summary": ...}`.
fn into_map(field: &'static str, value: Value) -> Result<Metadata, ExtractionError> {
    match value {
        Value::Null => Ok(Metadata::new()),
        Value::Object(map) => Ok(map),
        Value::String(s) if s.is_empty() => Ok(Metadata::new()),
        Value::String(s) => {
            let mut map = Metadata::new();
            map.insert("summary".to_string(), Value::String(s));
            Ok(map)
        }
        other => Err(ExtractionError::InvalidField {
            field,
            reason: format!("expected an object or string, got {}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AutomationLevel, TaskStatus};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_full_item() {
        let response = r#"[
            {
                "assignee": "John",
                "description": "Send NDA template to Acme Corp",
                "task_type": "document_creation",
                "urgency_level": "medium",
                "entities": {"company": "Acme Corp", "document_type": "NDA"},
                "context": "Discussed partnership opportunity with Acme Corp",
                "estimated_days_to_complete": 2,
                "confidence_score": 0.9
            }
        ]"#;

        let items = parse_action_items(response, now()).unwrap();
        assert_eq!(items.len(), 1);

        let item = &items[0];
        assert_eq!(item.assignee, "John");
        assert_eq!(item.task_type, TaskType::DocumentCreation);
        assert_eq!(item.urgency_level, UrgencyLevel::Medium);
        assert_eq!(item.estimated_deadline, Some(now() + Duration::days(2)));
        assert_eq!(item.entities["company"], "Acme Corp");
        assert_eq!(item.context["summary"], "Discussed partnership opportunity with Acme Corp");
        assert!((item.confidence_score - 0.9).abs() < f64::EPSILON);
        assert_eq!(item.status, TaskStatus::Pending);
        assert_eq!(item.automation_level, AutomationLevel::Manual);
        assert!(item.id.is_none());
        assert!(item.transcript_id.is_none());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let items = parse_action_items(r#"[{"description": "Follow up"}]"#, now()).unwrap();
        let item = &items[0];
        assert_eq!(item.assignee, "");
        assert_eq!(item.task_type, TaskType::Other);
        assert_eq!(item.urgency_level, UrgencyLevel::Medium);
        assert_eq!(item.estimated_deadline, None);
        assert_eq!(item.confidence_score, 0.0);
        assert!(item.context.is_empty());
        assert!(item.entities.is_empty());
    }

    #[test]
    fn test_empty_array_is_no_items() {
        assert!(parse_action_items("[]", now()).unwrap().is_empty());
        assert!(parse_action_items("No action items found: []", now()).unwrap().is_empty());
    }

    #[test]
    fn test_markdown_fenced_response() {
        let response = "Here are the action items:\n\n```json\n[\n  {\"assignee\": \"Sarah\", \"description\": \"Create timeline\", \"task_type\": \"document_creation\"}\n]\n```\n";
        let items = parse_action_items(response, now()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].assignee, "Sarah");
    }

    #[test]
    fn test_not_json_is_malformed() {
        let err = parse_action_items("I could not find any tasks.", now()).unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedResponse(_)));

        let err = parse_action_items(r#"{"assignee": "John"}"#, now()).unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedResponse(_)));
    }

    #[test]
    fn test_unknown_labels_are_errors() {
        let err = parse_action_items(r#"[{"task_type": "legal_review"}]"#, now()).unwrap_err();
        assert!(matches!(err, ExtractionError::UnknownLabel(ref e) if e.value == "legal_review"));

        let err = parse_action_items(r#"[{"urgency_level": "critical"}]"#, now()).unwrap_err();
        assert!(matches!(err, ExtractionError::UnknownLabel(_)));
    }

    #[test]
    fn test_fractional_and_null_days() {
        let items = parse_action_items(
            r#"[{"estimated_days_to_complete": 0.5}, {"estimated_days_to_complete": null}]"#,
            now(),
        )
        .unwrap();
        assert_eq!(items[0].estimated_deadline, Some(now() + Duration::hours(12)));
        assert_eq!(items[1].estimated_deadline, None);
    }

    #[test]
    fn test_non_numeric_days_is_invalid() {
        let err = parse_action_items(r#"[{"estimated_days_to_complete": "two"}]"#, now()).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::InvalidField { field: "estimated_days_to_complete", .. }
        ));
    }

    #[test]
    fn test_invalid_map_field() {
        let err = parse_action_items(r#"[{"entities": ["Acme"]}]"#, now()).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidField { field: "entities", .. }));
    }

    #[test]
    fn test_confidence_is_clamped() {
        let items = parse_action_items(
            r#"[{"confidence_score": 1.7}, {"confidence_score": -0.2}]"#,
            now(),
        )
        .unwrap();
        assert_eq!(items[0].confidence_score, 1.0);
        assert_eq!(items[1].confidence_score, 0.0);
    }

    #[test]
    fn test_bracketed_prose_before_array() {
        let response = r#"Found [1] item: [{"assignee": "John", "description": "Send proposal"}]"#;
        let items = parse_action_items(response, now()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].assignee, "John");

        let response = "Nothing here [] but see below\n```json\n[{\"assignee\": \"Sarah\"}]\n```";
        let items = parse_action_items(response, now()).unwrap();
        assert_eq!(items[0].assignee, "Sarah");
    }

    #[test]
    fn test_deadline_beyond_year_9999_is_invalid() {
        let err = parse_action_items(r#"[{"estimated_days_to_complete": 3000000}]"#, now()).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::InvalidField { field: "estimated_days_to_complete", .. }
        ));

        let err = parse_action_items(r#"[{"estimated_days_to_complete": -800000}]"#, now()).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidField { .. }));

        // Still inside the four-digit range.
        let items = parse_action_items(r#"[{"estimated_days_to_complete": 2900000}]"#, now()).unwrap();
        assert_eq!(items[0].estimated_deadline.unwrap().year(), 9963);
    }
}
