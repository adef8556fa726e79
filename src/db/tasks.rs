//! Task CRUD and completion toggles.

use super::filter::{TaskFilter, compose};
use super::{Database, now};
use crate::error::TaskError;
use crate::types::{NewTask, Priority, Task};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{Connection, Row, ToSql, params, params_from_iter};
use tracing::{debug, info};

const TASK_COLUMNS: &str = "id, title, completed, created_at, updated_at, priority, due_date, tags";

impl ToSql for Priority {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

/// NULL or empty falls back to the column default.
impl FromSql for Priority {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(Priority::default()),
            other => {
                let text = other.as_str()?;
                if text.is_empty() {
                    return Ok(Priority::default());
                }
                text.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    }
}

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        completed: row.get("completed")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        priority: row.get("priority")?,
        due_date: row.get("due_date")?,
        tags: row.get("tags")?,
    })
}

/// Set the completion flag and refresh `updated_at`. Zero rows means no such task.
fn set_completed(conn: &Connection, task_id: i64, completed: bool) -> Result<(), TaskError> {
    let affected = conn.execute(
        "UPDATE tasks SET completed = ?1, updated_at = ?2 WHERE id = ?3",
        params![completed, now(), task_id],
    )?;
    if affected == 0 {
        return Err(TaskError::not_found(task_id));
    }
    Ok(())
}

impl Database {
    /// Insert a validated task. Both timestamps get the same instant.
    pub fn create_task(&self, task: &NewTask) -> Result<Task, TaskError> {
        let now = now();

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (title, completed, created_at, updated_at, priority, due_date, tags)
                 VALUES (?1, 0, ?2, ?2, ?3, ?4, ?5)",
                params![task.title(), now, task.priority(), task.due_date(), task.tags()],
            )?;
            let id = conn.last_insert_rowid();

            info!(task_id = id, "Task created");

            Ok(Task {
                id,
                title: task.title().to_string(),
                completed: false,
                created_at: now,
                updated_at: now,
                priority: task.priority(),
                due_date: task.due_date().map(str::to_string),
                tags: task.tags().map(str::to_string),
            })
        })
        .map_err(|e| e.during("Failed to create task"))
    }

    /// List tasks matching every given filter, in insertion order.
    pub fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, TaskError> {
        let clause = compose(filter.predicates());
        let sql = format!("SELECT {} FROM tasks{} ORDER BY id", TASK_COLUMNS, clause.sql);
        debug!(sql = %sql, params = clause.params.len(), "Listing tasks");

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let tasks = stmt
                .query_map(params_from_iter(clause.params.iter()), parse_task_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(tasks)
        })
        .map_err(|e| e.during("Failed to retrieve tasks"))
    }

    /// Get a task by ID.
    pub fn get_task(&self, task_id: i64) -> Result<Task, TaskError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS))?;

            match stmt.query_row(params![task_id], parse_task_row) {
                Ok(task) => Ok(task),
                Err(rusqlite::Error::QueryReturnedNoRows) => Err(TaskError::not_found(task_id)),
                Err(e) => Err(e.into()),
            }
        })
        .map_err(|e| e.during("Failed to retrieve task"))
    }

    /// Mark a task completed. Repeating it only refreshes `updated_at`.
    pub fn mark_done(&self, task_id: i64) -> Result<(), TaskError> {
        self.with_conn(|conn| set_completed(conn, task_id, true))
            .map_err(|e| e.during("Failed to update task"))?;
        info!(task_id, "Task marked as done");
        Ok(())
    }

    /// Mark a task pending again. Repeating it only refreshes `updated_at`.
    pub fn mark_undone(&self, task_id: i64) -> Result<(), TaskError> {
        self.with_conn(|conn| set_completed(conn, task_id, false))
            .map_err(|e| e.during("Failed to update task"))?;
        info!(task_id, "Task marked as undone");
        Ok(())
    }

    /// Delete a task permanently.
    pub fn delete_task(&self, task_id: i64) -> Result<(), TaskError> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
            if affected == 0 {
                return Err(TaskError::not_found(task_id));
            }
            Ok(())
        })
        .map_err(|e| e.during("Failed to delete task"))?;
        info!(task_id, "Task deleted");
        Ok(())
    }
}
