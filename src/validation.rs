//! Validation of task-creation payloads.
//!
//! This is the only way to obtain a [`NewTask`]. Checks run in order and stop
//! at the first failure:
//!
//! 1. the body must deserialize into [`TaskInput`] (a bare `null` counts as
//!    an empty object)
//! 2. the trimmed title must be present and non-empty
//! 3. the priority, lower-cased, must be `low`, `medium`, `high` or empty
//! 4. a non-empty `due_date` must be a real calendar date in `YYYY-MM-DD` form

use crate::error::TaskError;
use crate::types::{NewTask, Priority, TaskInput};
use chrono::NaiveDate;
use tracing::debug;

/// chrono format string for due dates.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse and validate a raw request body.
pub fn validate_task_payload(body: &[u8]) -> Result<NewTask, TaskError> {
    let input: Option<TaskInput> = serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "Rejected task payload: malformed JSON");
        TaskError::InvalidBody(e.to_string())
    })?;
    validate_task_input(input.unwrap_or_default())
}

/// Validate an already-deserialized payload and normalize it.
pub fn validate_task_input(input: TaskInput) -> Result<NewTask, TaskError> {
    let title = input.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        debug!("Rejected task payload: empty title");
        return Err(TaskError::MissingTitle);
    }

    let priority = normalize_priority(input.priority.as_deref())?;
    let due_date = check_due_date(input.due_date)?;
    let tags = input.tags.filter(|t| !t.is_empty());

    Ok(NewTask::new(title.to_string(), priority, due_date, tags))
}

/// Empty or absent priority means "unset" and becomes the storage default.
fn normalize_priority(raw: Option<&str>) -> Result<Priority, TaskError> {
    match raw {
        None | Some("") => Ok(Priority::default()),
        Some(value) => value.parse().map_err(|_| {
            debug!(priority = %value, "Rejected task payload: unknown priority");
            TaskError::InvalidPriority(value.to_string())
        }),
    }
}

fn check_due_date(raw: Option<String>) -> Result<Option<String>, TaskError> {
    match raw {
        None => Ok(None),
        Some(value) if value.is_empty() => Ok(None),
        Some(value) if is_calendar_date(&value) => Ok(Some(value)),
        Some(value) => {
            debug!(due_date = %value, "Rejected task payload: bad due_date");
            Err(TaskError::InvalidDueDate(value))
        }
    }
}

/// Exactly `YYYY-MM-DD` with zero-padded fields, and a date that exists.
pub fn is_calendar_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    shape_ok && NaiveDate::parse_from_str(value, DUE_DATE_FORMAT).is_ok()
}
