//! HTTP server implementation.
//!
//! This module provides the axum router exposing the `/tasks` REST API and
//! the serve loop used by the binary.

use axum::{
    Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, put},
};
use serde::Serialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::db::Database;
use crate::db::filter::TaskFilter;
use crate::error::TaskError;
use crate::types::Task;
use crate::validation::validate_task_payload;

/// Server state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Database>,
}

impl AppState {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Run a storage call on the blocking pool so a slow database only
    /// holds up the request that issued it.
    async fn with_db<F, T>(&self, f: F) -> Result<T, TaskError>
    where
        F: FnOnce(&Database) -> Result<T, TaskError> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(db.as_ref()))
            .await
            .map_err(|e| TaskError::storage(e).during("Internal server error"))?
    }
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Confirmation body for mutations that do not return the task.
#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
}

/// Query parameters for the task list. Empty values are treated as absent.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TaskListParams {
    pub completed: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub tags: Option<String>,
}

impl TaskListParams {
    /// Collect known keys from decoded query pairs. A repeated key keeps its
    /// first value; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "completed" => &mut params.completed,
                "priority" => &mut params.priority,
                "due_date" => &mut params.due_date,
                "tags" => &mut params.tags,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }

    /// `completed=true` selects done tasks; any other non-empty value selects pending ones.
    pub fn into_filter(self) -> TaskFilter {
        TaskFilter {
            completed: self
                .completed
                .filter(|c| !c.is_empty())
                .map(|c| c == "true"),
            priority: self.priority.filter(|s| !s.is_empty()),
            due_date: self.due_date.filter(|s| !s.is_empty()),
            tags: self.tags.filter(|s| !s.is_empty()),
        }
    }
}

/// A path id that is not an integer cannot name an existing task.
fn parse_task_id(raw: &str) -> Result<i64, TaskError> {
    raw.parse().map_err(|_| TaskError::not_found(raw))
}

/// POST /tasks
async fn create_task(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Task>), TaskError> {
    let new_task = validate_task_payload(&body).inspect_err(|e| {
        warn!(code = ?e.code(), "Task creation rejected: {}", e);
    })?;

    let task = state.with_db(move |db| db.create_task(&new_task)).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /tasks
async fn list_tasks(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Task>>, TaskError> {
    let filter = TaskListParams::from_pairs(pairs).into_filter();
    let tasks = state.with_db(move |db| db.list_tasks(&filter)).await?;
    Ok(Json(tasks))
}

/// GET /tasks/{id}
async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, TaskError> {
    let task_id = parse_task_id(&task_id)?;
    let task = state.with_db(move |db| db.get_task(task_id)).await?;
    Ok(Json(task))
}

/// PUT /tasks/{id}/done
async fn mark_task_done(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<MessageResponse>, TaskError> {
    let task_id = parse_task_id(&task_id)?;
    state.with_db(move |db| db.mark_done(task_id)).await?;
    Ok(Json(MessageResponse {
        message: "Task marked as done",
    }))
}

/// PUT /tasks/{id}/undone
async fn mark_task_undone(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<MessageResponse>, TaskError> {
    let task_id = parse_task_id(&task_id)?;
    state.with_db(move |db| db.mark_undone(task_id)).await?;
    Ok(Json(MessageResponse {
        message: "Task marked as undone",
    }))
}

/// DELETE /tasks/{id}
async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<MessageResponse>, TaskError> {
    let task_id = parse_task_id(&task_id)?;
    state.with_db(move |db| db.delete_task(task_id)).await?;
    Ok(Json(MessageResponse {
        message: "Task deleted",
    }))
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the router with all routes.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", get(get_task).delete(delete_task))
        .route("/tasks/{id}/done", put(mark_task_done))
        .route("/tasks/{id}/undone", put(mark_task_undone))
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until `shutdown` resolves.
pub async fn serve<S>(db: Arc<Database>, addr: &str, shutdown: S) -> anyhow::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let app = build_router(AppState::new(db));

    let listener = TcpListener::bind(addr).await?;
    let bound_addr: SocketAddr = listener.local_addr()?;
    info!("Task API listening on http://{}", bound_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Task API shut down");
    Ok(())
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            version: "0.1.0",
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("0.1.0"));
    }

    #[test]
    fn test_completed_param_maps_true_and_anything_else() {
        let params = TaskListParams {
            completed: Some("true".into()),
            ..Default::default()
        };
        assert_eq!(params.into_filter().completed, Some(true));

        let params = TaskListParams {
            completed: Some("yes".into()),
            ..Default::default()
        };
        assert_eq!(params.into_filter().completed, Some(false));

        let params = TaskListParams {
            completed: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(params.into_filter().completed, None);
    }

    #[test]
    fn test_empty_params_produce_empty_filter() {
        let params = TaskListParams {
            priority: Some(String::new()),
            tags: Some(String::new()),
            ..Default::default()
        };
        assert!(params.into_filter().is_empty());
    }

    #[test]
    fn test_repeated_key_keeps_first_value() {
        let pairs = vec![
            ("priority".to_string(), "high".to_string()),
            ("sort".to_string(), "desc".to_string()),
            ("priority".to_string(), "low".to_string()),
        ];
        let params = TaskListParams::from_pairs(pairs);
        assert_eq!(params.priority.as_deref(), Some("high"));
        assert_eq!(params.completed, None);
    }

    #[test]
    fn test_non_numeric_id_is_not_found() {
        assert!(matches!(parse_task_id("abc"), Err(TaskError::NotFound(_))));
        assert_eq!(parse_task_id("17").unwrap(), 17);
    }
}
