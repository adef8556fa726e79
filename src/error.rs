//! Error taxonomy shared by the validator, the repository and the HTTP layer.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client input errors
    InvalidBody,
    MissingTitle,
    InvalidPriority,
    InvalidDueDate,

    // Not found errors
    TaskNotFound,

    // Internal errors
    DatabaseError,
}

/// Default action reported when a storage failure has no more specific context.
const STORAGE_ACTION: &str = "Storage operation failed";

#[derive(Debug, Error)]
pub enum TaskError {
    /// Payload is not JSON or does not match the task shape.
    #[error("Invalid JSON body")]
    InvalidBody(String),

    #[error("Title is required")]
    MissingTitle,

    #[error("Invalid priority. Use low, medium, or high")]
    InvalidPriority(String),

    #[error("Invalid due_date format. Use YYYY-MM-DD")]
    InvalidDueDate(String),

    #[error("Task not found")]
    NotFound(String),

    /// The persistence layer failed. `action` is safe to show to clients,
    /// `detail` is not.
    #[error("{action}: {detail}")]
    Storage { action: &'static str, detail: String },
}

impl TaskError {
    pub fn not_found(id: impl fmt::Display) -> Self {
        TaskError::NotFound(id.to_string())
    }

    pub fn storage(detail: impl fmt::Display) -> Self {
        TaskError::Storage {
            action: STORAGE_ACTION,
            detail: detail.to_string(),
        }
    }

    /// Attach the client-facing action to a storage failure.
    /// Other variants pass through untouched.
    pub fn during(self, action: &'static str) -> Self {
        match self {
            TaskError::Storage { detail, .. } => TaskError::Storage { action, detail },
            other => other,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            TaskError::InvalidBody(_) => ErrorCode::InvalidBody,
            TaskError::MissingTitle => ErrorCode::MissingTitle,
            TaskError::InvalidPriority(_) => ErrorCode::InvalidPriority,
            TaskError::InvalidDueDate(_) => ErrorCode::InvalidDueDate,
            TaskError::NotFound(_) => ErrorCode::TaskNotFound,
            TaskError::Storage { .. } => ErrorCode::DatabaseError,
        }
    }

    /// Input field the error refers to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            TaskError::MissingTitle => Some("title"),
            TaskError::InvalidPriority(_) => Some("priority"),
            TaskError::InvalidDueDate(_) => Some("due_date"),
            _ => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            TaskError::InvalidBody(_)
            | TaskError::MissingTitle
            | TaskError::InvalidPriority(_)
            | TaskError::InvalidDueDate(_) => StatusCode::BAD_REQUEST,
            TaskError::NotFound(_) => StatusCode::NOT_FOUND,
            TaskError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to clients. Storage details never leave the process.
    pub fn client_message(&self) -> String {
        match self {
            TaskError::Storage { action, .. } => (*action).to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

impl From<rusqlite::Error> for TaskError {
    fn from(err: rusqlite::Error) -> Self {
        TaskError::storage(err)
    }
}

/// JSON body of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

impl From<&TaskError> for ErrorBody {
    fn from(err: &TaskError) -> Self {
        Self {
            error: err.client_message(),
            code: err.code(),
            field: err.field(),
        }
    }
}

impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        if let TaskError::Storage { action, detail } = &self {
            tracing::error!(action = %action, detail = %detail, "Storage failure");
        }
        (self.status(), Json(ErrorBody::from(&self))).into_response()
    }
}
