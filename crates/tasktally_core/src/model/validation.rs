//! Field-level validation shared by all records.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Validation failure for domain records and request input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Required text field is empty or whitespace only.
    #[error("{field} is required")]
    Required { field: &'static str },
    /// Text field exceeds its maximum length in characters.
    #[error("{field} must be at most {max} characters, got {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
    /// Enum value does not match any symbolic variant name.
    #[error("unknown {field} `{value}`")]
    UnknownValue { field: &'static str, value: String },
    /// A time entry ends before it starts.
    #[error("end time {end} precedes start time {start}")]
    EndBeforeStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// Stored duration disagrees with the entry's start/end times.
    #[error("duration {actual_ms}ms does not match end - start ({expected_ms}ms)")]
    DurationMismatch { expected_ms: i64, actual_ms: i64 },
}

pub(crate) fn require_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    limit_text(field, value, max)
}

pub(crate) fn limit_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}
