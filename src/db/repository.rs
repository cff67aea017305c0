use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::models::Task;
use crate::services::TaskPatch;

pub async fn fetch_tasks(conn: &mut SqliteConnection) -> Result<Vec<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        r#"
        SELECT id, title, description, due_date, completed, created_at, updated_at
        FROM tasks
        ORDER BY created_at DESC, id DESC
        "#
    )
    .fetch_all(conn)
    .await
}

pub async fn find_task_by_id(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        r#"
        SELECT id, title, description, due_date, completed, created_at, updated_at
        FROM tasks
        WHERE id = ?
        "#
    )
    .bind(id)
    .fetch_optional(conn)
    .await
}

pub async fn task_exists(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    let found = sqlx::query_scalar::<_, i64>("SELECT 1 FROM tasks WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(found.is_some())
}

/// Inserts a fresh, uncompleted task and returns the id SQLite assigned.
pub async fn insert_task(
    conn: &mut SqliteConnection,
    title: &str,
    description: Option<&str>,
    due_date: Option<&str>,
    created_at: &str,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO tasks (title, description, due_date, completed, created_at)
        VALUES (?1, ?2, ?3, 0, ?4)
        "#
    )
    .bind(title)
    .bind(description)
    .bind(due_date)
    .bind(created_at)
    .execute(conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Writes every staged column of `patch` in one statement.
/// Returns the number of rows touched; an empty patch issues no SQL.
pub async fn apply_patch(
    conn: &mut SqliteConnection,
    id: i64,
    patch: &TaskPatch,
) -> Result<u64, sqlx::Error> {
    if !patch.has_changes() {
        return Ok(0);
    }

    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE tasks SET ");
    let mut columns = builder.separated(", ");

    if let Some(title) = &patch.title {
        columns.push("title = ").push_bind_unseparated(title.clone());
    }
    if let Some(description) = &patch.description {
        columns.push("description = ").push_bind_unseparated(description.clone());
    }
    if let Some(due_date) = &patch.due_date {
        columns.push("due_date = ").push_bind_unseparated(due_date.clone());
    }
    if let Some(completed) = patch.completed {
        columns.push("completed = ").push_bind_unseparated(completed);
    }
    if let Some(updated_at) = &patch.updated_at {
        columns.push("updated_at = ").push_bind_unseparated(updated_at.clone());
    }

    builder.push(" WHERE id = ").push_bind(id);

    let result = builder.build().execute(conn).await?;
    Ok(result.rows_affected())
}

pub async fn delete_task(conn: &mut SqliteConnection, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    async fn insert(conn: &mut SqliteConnection, title: &str, created_at: &str) -> i64 {
        insert_task(conn, title, None, None, created_at)
            .await
            .expect("Failed to insert task")
    }

    #[tokio::test]
    async fn test_insert_and_find_task() {
        let pool = connect_in_memory().await.expect("Failed to create test db");
        let mut conn = pool.acquire().await.unwrap();

        let id = insert_task(
            &mut conn,
            "Water plants",
            Some("balcony"),
            Some("2024-01-01"),
            "2025-01-01T00:00:00.000000Z",
        )
        .await
        .expect("Failed to insert task");

        let task = find_task_by_id(&mut conn, id)
            .await
            .unwrap()
            .expect("Task not found");
        assert_eq!(task.id, id);
        assert_eq!(task.title, "Water plants");
        assert_eq!(task.description.as_deref(), Some("balcony"));
        assert_eq!(task.due_date.as_deref(), Some("2024-01-01"));
        assert!(!task.completed);
        assert_eq!(task.updated_at, None);
    }

    #[tokio::test]
    async fn test_ids_are_assigned_by_storage() {
        let pool = connect_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let first = insert(&mut conn, "a", "2025-01-01T00:00:00.000000Z").await;
        let second = insert(&mut conn, "b", "2025-01-01T00:00:01.000000Z").await;
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_fetch_tasks_newest_first() {
        let pool = connect_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        insert(&mut conn, "old", "2025-01-01T00:00:00.000000Z").await;
        insert(&mut conn, "new", "2025-03-01T00:00:00.000000Z").await;
        insert(&mut conn, "mid", "2025-02-01T00:00:00.000000Z").await;

        let titles: Vec<String> = fetch_tasks(&mut conn)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_apply_patch_writes_only_staged_columns() {
        let pool = connect_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let id = insert_task(
            &mut conn,
            "Draft",
            Some("notes"),
            Some("2024-05-05"),
            "2025-01-01T00:00:00.000000Z",
        )
        .await
        .unwrap();

        let patch = TaskPatch {
            due_date: Some(None),
            completed: Some(true),
            updated_at: Some("2025-01-02T00:00:00.000000Z".to_string()),
            ..TaskPatch::default()
        };
        let touched = apply_patch(&mut conn, id, &patch).await.unwrap();
        assert_eq!(touched, 1);

        let task = find_task_by_id(&mut conn, id).await.unwrap().unwrap();
        assert_eq!(task.title, "Draft");
        assert_eq!(task.description.as_deref(), Some("notes"));
        assert_eq!(task.due_date, None);
        assert!(task.completed);
        assert_eq!(task.updated_at.as_deref(), Some("2025-01-02T00:00:00.000000Z"));
    }

    #[tokio::test]
    async fn test_apply_empty_patch_is_noop() {
        let pool = connect_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let id = insert(&mut conn, "Keep", "2025-01-01T00:00:00.000000Z").await;

        let touched = apply_patch(&mut conn, id, &TaskPatch::default()).await.unwrap();
        assert_eq!(touched, 0);
        let task = find_task_by_id(&mut conn, id).await.unwrap().unwrap();
        assert_eq!(task.updated_at, None);
    }

    #[tokio::test]
    async fn test_delete_task() {
        let pool = connect_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let id = insert(&mut conn, "Remove me", "2025-01-01T00:00:00.000000Z").await;

        assert!(task_exists(&mut conn, id).await.unwrap());
        assert_eq!(delete_task(&mut conn, id).await.unwrap(), 1);
        assert!(!task_exists(&mut conn, id).await.unwrap());
        assert_eq!(delete_task(&mut conn, id).await.unwrap(), 0);
    }
}
