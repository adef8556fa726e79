//! Core types for the task service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Task priority. Stored and serialized in lower case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of `low`, `medium` or `high`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown priority: {0:?}")]
pub struct ParsePriorityError(pub String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    /// Case-insensitive; surrounding whitespace is not stripped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(ParsePriorityError(s.to_string())),
        }
    }
}

/// A persisted task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub priority: Priority,
    /// Calendar date in `YYYY-MM-DD` form.
    pub due_date: Option<String>,
    /// Comma-separated labels, stored verbatim.
    pub tags: Option<String>,
}

/// Raw task-creation payload as sent by clients.
///
/// Nothing here is trusted; it only becomes a [`NewTask`] after passing
/// through [`crate::validation::validate_task_input`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskInput {
    /// `None` covers both an absent and a `null` title.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
}

/// A validated, normalized task ready to be inserted.
///
/// Can only be built by the validator, so the repository never sees
/// unchecked input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    title: String,
    priority: Priority,
    due_date: Option<String>,
    tags: Option<String>,
}

impl NewTask {
    pub(crate) fn new(
        title: String,
        priority: Priority,
        due_date: Option<String>,
        tags: Option<String>,
    ) -> Self {
        Self {
            title,
            priority,
            due_date,
            tags,
        }
    }

    /// Trimmed, non-empty title.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn due_date(&self) -> Option<&str> {
        self.due_date.as_deref()
    }

    pub fn tags(&self) -> Option<&str> {
        self.tags.as_deref()
    }
}
