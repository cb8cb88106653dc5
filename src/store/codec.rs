//! Conversions between model types and SQLite column values.
//!
//! Tags are stored as their string labels, maps and lists as JSON text and
//! timestamps as RFC 3339 UTC with fixed nanosecond precision, which keeps
//! them exact on read-back and lets them sort as plain text.

use crate::error::ReferatError;
use crate::model::{AutomationLevel, TaskStatus, TaskType, UrgencyLevel};
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef};
use rusqlite::Row;
use serde::de::DeserializeOwned;
use serde::Serialize;

macro_rules! label_column {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ToSql for $ty {
                fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                    Ok(ToSqlOutput::from(self.as_str()))
                }
            }

            impl FromSql for $ty {
                fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                    value
                        .as_str()?
                        .parse()
                        .map_err(|e| FromSqlError::Other(Box::new(e)))
                }
            }
        )+
    };
}

label_column!(TaskType, UrgencyLevel, TaskStatus, AutomationLevel);

/// Encode a timestamp for storage.
///
/// Only years 0000 to 9999 are accepted. Outside that range chrono writes a
/// signed, wider year that neither parses back nor sorts with the rest.
pub fn encode_time(time: &DateTime<Utc>) -> crate::Result<String> {
    if !(0..=9999).contains(&time.year()) {
        return Err(ReferatError::InvalidInput(format!(
            "Timestamp {} is outside the storable range (years 0000-9999)",
            time
        )));
    }
    Ok(time.to_rfc3339_opts(SecondsFormat::Nanos, true))
}

/// Encode an optional timestamp for storage.
pub fn encode_optional_time(time: Option<&DateTime<Utc>>) -> crate::Result<Option<String>> {
    time.map(encode_time).transpose()
}

/// Encode a value as JSON text for storage.
pub fn encode_json<T: Serialize>(value: &T) -> crate::Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Read a required timestamp column.
pub fn time_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    parse_time(idx, &text)
}

/// Read a nullable timestamp column.
pub fn optional_time_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| parse_time(idx, &t)).transpose()
}

/// Read a JSON text column.
pub fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_time(idx: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_encoded_times_sort_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        let later = earlier + chrono::Duration::nanoseconds(1_500);
        assert!(encode_time(&earlier).unwrap() < encode_time(&later).unwrap());
        assert_eq!(encode_time(&earlier).unwrap(), "2024-01-15T09:00:00.000000000Z");
    }

    #[test]
    fn test_time_roundtrip_keeps_nanoseconds() {
        let time = Utc.timestamp_opt(1_705_309_200, 123_456_789).unwrap();
        let parsed = parse_time(0, &encode_time(&time).unwrap()).unwrap();
        assert_eq!(parsed, time);
    }

    #[test]
    fn test_unknown_label_fails_conversion() {
        let result = TaskStatus::column_result(ValueRef::Text(b"archived"));
        assert!(result.is_err());

        let status = TaskStatus::column_result(ValueRef::Text(b"in_progress")).unwrap();
        assert_eq!(status, TaskStatus::InProgress);
    }

    #[test]
    fn test_five_digit_years_are_rejected() {
        let far = Utc.with_ymd_and_hms(10240, 3, 1, 0, 0, 0).unwrap();
        assert!(matches!(encode_time(&far), Err(ReferatError::InvalidInput(_))));

        let last = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();
        let encoded = encode_time(&last).unwrap();
        assert_eq!(parse_time(0, &encoded).unwrap(), last);

        assert_eq!(encode_optional_time(None).unwrap(), None);
        assert!(encode_optional_time(Some(&far)).is_err());
    }
}
