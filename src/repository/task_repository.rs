use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{CreateTaskRequest, Task, UpdateTaskRequest},
    error::{AppError, Result},
    repository::TaskRepository,
};

#[derive(FromRow)]
struct TaskRow {
    id: String,
    title: String,
    done: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteTaskRepository {
    pool: SqlitePool,
}

impl SqliteTaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_task(row: TaskRow) -> Result<Task> {
        Ok(Task {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            title: row.title,
            done: row.done != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn create(&self, request: CreateTaskRequest) -> Result<Task> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO tasks (id, title, done, created_at, updated_at)
            VALUES (?, ?, 0, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&request.title)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created task".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, title, done, created_at, updated_at
            FROM tasks
            WHERE id = ?
            "#,
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_task(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, title, done, created_at, updated_at
            FROM tasks
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_task).collect()
    }

    async fn update(&self, id: Uuid, update: UpdateTaskRequest) -> Result<Task> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

        let id_str = id.to_string();
        let now = Utc::now().naive_utc();
        let done_int = update.done.map(|d| if d { 1i32 } else { 0i32 });

        sqlx::query(
            r#"
            UPDATE tasks
            SET title = COALESCE(?, title),
                done = COALESCE(?, done),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.title)
        .bind(done_int)
        .bind(now)
        .bind(&id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated task".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
