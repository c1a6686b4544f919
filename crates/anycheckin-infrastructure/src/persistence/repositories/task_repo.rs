use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

use crate::persistence::{RepositoryErrorMapper, SqliteRepositoryBase};
use anycheckin_domain::shared::{AccountId, DomainError, TaskId};
use anycheckin_domain::task::{Task, TaskRepository};

#[derive(FromRow)]
struct TaskRow {
    id: i64,
    name: String,
    cron_expr: String,
    account_ids: String,
    enabled: bool,
    last_run: Option<DateTime<Utc>>,
    next_run: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TaskRow {
    fn into_task(self) -> Result<Task, DomainError> {
        let account_ids: Vec<AccountId> = serde_json::from_str(&self.account_ids)
            .map_err(|e| RepositoryErrorMapper::map_json_error(e, "Deserialize task account ids"))?;

        Ok(Task::restore(
            TaskId::new(self.id),
            self.name,
            self.cron_expr,
            account_ids,
            self.enabled,
            self.last_run,
            self.next_run,
            self.created_at,
        ))
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, name, cron_expr, account_ids, enabled, last_run, next_run, created_at FROM tasks";

pub struct SqliteTaskRepository {
    base: SqliteRepositoryBase,
}

impl SqliteTaskRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
        }
    }

    fn encode_account_ids(task: &Task) -> Result<String, DomainError> {
        serde_json::to_string(task.account_ids())
            .map_err(|e| RepositoryErrorMapper::map_json_error(e, "Serialize task account ids"))
    }

    async fn fetch_many(&self, query: &str, context: &str) -> Result<Vec<Task>, DomainError> {
        let rows: Vec<TaskRow> = self.base.fetch_all(sqlx::query_as(query), context).await?;
        rows.into_iter().map(TaskRow::into_task).collect()
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn create(&self, task: &Task) -> Result<Task, DomainError> {
        let query = r#"
            INSERT INTO tasks (name, cron_expr, account_ids, enabled, last_run, next_run, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#;

        let result = self
            .base
            .execute(
                sqlx::query(query)
                    .bind(task.name())
                    .bind(task.cron_expr())
                    .bind(Self::encode_account_ids(task)?)
                    .bind(task.is_enabled())
                    .bind(task.last_run())
                    .bind(task.next_run())
                    .bind(task.created_at()),
                "Create task",
            )
            .await?;

        let id = TaskId::new(result.last_insert_rowid());
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::TaskNotFound(id.to_string()))
    }

    async fn save(&self, task: &Task) -> Result<(), DomainError> {
        let query = r#"
            UPDATE tasks SET
                name = ?2,
                cron_expr = ?3,
                account_ids = ?4,
                enabled = ?5,
                last_run = ?6,
                next_run = ?7
            WHERE id = ?1
        "#;

        let result = self
            .base
            .execute(
                sqlx::query(query)
                    .bind(task.id().value())
                    .bind(task.name())
                    .bind(task.cron_expr())
                    .bind(Self::encode_account_ids(task)?)
                    .bind(task.is_enabled())
                    .bind(task.last_run())
                    .bind(task.next_run()),
                "Save task",
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::TaskNotFound(task.id().to_string()));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, DomainError> {
        let query = format!("{} WHERE id = ?1", SELECT_COLUMNS);

        let row: Option<TaskRow> = self
            .base
            .fetch_optional(sqlx::query_as(&query).bind(id.value()), "Find task by ID")
            .await?;

        row.map(TaskRow::into_task).transpose()
    }

    async fn list(&self) -> Result<Vec<Task>, DomainError> {
        let query = format!("{} ORDER BY id", SELECT_COLUMNS);
        self.fetch_many(&query, "List tasks").await
    }

    async fn list_enabled(&self) -> Result<Vec<Task>, DomainError> {
        let query = format!("{} WHERE enabled = 1 ORDER BY id", SELECT_COLUMNS);
        self.fetch_many(&query, "List enabled tasks").await
    }

    async fn delete(&self, id: TaskId) -> Result<(), DomainError> {
        let result = self
            .base
            .execute(
                sqlx::query("DELETE FROM tasks WHERE id = ?1").bind(id.value()),
                "Delete task",
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::TaskNotFound(id.to_string()));
        }
        Ok(())
    }
}
