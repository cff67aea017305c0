use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::db::repository;
use crate::error::AppError;
use crate::models::{NewTaskRequest, Task, TaskList, UpdateTaskRequest, timestamp_now};
use crate::services::TaskPatch;
use crate::validation::{validate_due_date, validate_title};

/// Task operations. Each call holds one pooled connection for its whole
/// duration and hands it back when it returns, on success or error.
pub struct TaskService {
    db: SqlitePool,
}

impl TaskService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn create(&self, req: NewTaskRequest) -> Result<Task, AppError> {
        let title = validate_title(req.title.as_deref())?;
        validate_due_date(req.due_date.as_deref())?;

        let mut conn = self.db.acquire().await?;
        let id = repository::insert_task(
            &mut conn,
            title,
            req.description.as_deref(),
            req.due_date.as_deref(),
            &timestamp_now(),
        )
        .await?;
        info!(task_id = id, "task created");

        // Return what storage actually persisted.
        let task = repository::find_task_by_id(&mut conn, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        Ok(task)
    }

    pub async fn list(&self) -> Result<TaskList, AppError> {
        let mut conn = self.db.acquire().await?;
        let tasks = repository::fetch_tasks(&mut conn).await?;
        Ok(TaskList::from(tasks))
    }

    pub async fn get(&self, id: i64) -> Result<Task, AppError> {
        let mut conn = self.db.acquire().await?;
        repository::find_task_by_id(&mut conn, id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Applies a partial update and returns the row as stored afterwards.
    ///
    /// The existence probe and the `UPDATE` are separate statements. A delete
    /// landing between them leaves the update with nothing to write, and the
    /// re-read then reports `NotFound`.
    pub async fn update(&self, id: i64, req: UpdateTaskRequest) -> Result<Task, AppError> {
        let mut conn = self.db.acquire().await?;
        if !repository::task_exists(&mut conn, id).await? {
            return Err(AppError::NotFound);
        }

        let patch = TaskPatch::from_request(req, timestamp_now)?;
        if patch.has_changes() {
            let touched = repository::apply_patch(&mut conn, id, &patch).await?;
            info!(task_id = id, rows = touched, "task updated");
        } else {
            debug!(task_id = id, "update carried no known fields");
        }

        repository::find_task_by_id(&mut conn, id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut conn = self.db.acquire().await?;
        if !repository::task_exists(&mut conn, id).await? {
            return Err(AppError::NotFound);
        }

        repository::delete_task(&mut conn, id).await?;
        info!(task_id = id, "task deleted");
        Ok(())
    }
}
