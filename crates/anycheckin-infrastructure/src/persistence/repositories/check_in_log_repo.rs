use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

use crate::persistence::SqliteRepositoryBase;
use anycheckin_domain::check_in::{CheckInLog, CheckInLogRepository};
use anycheckin_domain::shared::{AccountId, CheckInLogId, DomainError};

#[derive(FromRow)]
struct CheckInLogRow {
    id: i64,
    account_id: i64,
    success: bool,
    message: String,
    created_at: DateTime<Utc>,
}

impl CheckInLogRow {
    fn into_log(self) -> CheckInLog {
        CheckInLog::restore(
            CheckInLogId::new(self.id),
            AccountId::new(self.account_id),
            self.success,
            self.message,
            self.created_at,
        )
    }
}

pub struct SqliteCheckInLogRepository {
    base: SqliteRepositoryBase,
}

impl SqliteCheckInLogRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
        }
    }
}

#[async_trait]
impl CheckInLogRepository for SqliteCheckInLogRepository {
    async fn append(&self, log: &CheckInLog) -> Result<CheckInLog, DomainError> {
        let query = r#"
            INSERT INTO check_in_logs (account_id, success, message, created_at)
            VALUES (?1, ?2, ?3, ?4)
        "#;

        let result = self
            .base
            .execute(
                sqlx::query(query)
                    .bind(log.account_id().value())
                    .bind(log.is_success())
                    .bind(log.message())
                    .bind(log.created_at()),
                "Append check-in log",
            )
            .await?;

        Ok(CheckInLog::restore(
            CheckInLogId::new(result.last_insert_rowid()),
            log.account_id(),
            log.is_success(),
            log.message().to_string(),
            log.created_at(),
        ))
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<CheckInLog>, DomainError> {
        let query = r#"
            SELECT id, account_id, success, message, created_at
            FROM check_in_logs
            ORDER BY created_at DESC, id DESC
            LIMIT ?1
        "#;

        let rows: Vec<CheckInLogRow> = self
            .base
            .fetch_all(sqlx::query_as(query).bind(limit), "List recent check-in logs")
            .await?;

        Ok(rows.into_iter().map(CheckInLogRow::into_log).collect())
    }

    async fn list_by_account(
        &self,
        account_id: AccountId,
        limit: i64,
    ) -> Result<Vec<CheckInLog>, DomainError> {
        let query = r#"
            SELECT id, account_id, success, message, created_at
            FROM check_in_logs
            WHERE account_id = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
        "#;

        let rows: Vec<CheckInLogRow> = self
            .base
            .fetch_all(
                sqlx::query_as(query).bind(account_id.value()).bind(limit),
                "List check-in logs by account",
            )
            .await?;

        Ok(rows.into_iter().map(CheckInLogRow::into_log).collect())
    }

    async fn find_latest_successful(&self) -> Result<Option<CheckInLog>, DomainError> {
        let query = r#"
            SELECT id, account_id, success, message, created_at
            FROM check_in_logs
            WHERE success = 1
            ORDER BY id DESC
            LIMIT 1
        "#;

        let row: Option<CheckInLogRow> = self
            .base
            .fetch_optional(sqlx::query_as(query), "Find latest successful check-in log")
            .await?;

        Ok(row.map(CheckInLogRow::into_log))
    }

    async fn count_successful_accounts_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64, DomainError> {
        let query = r#"
            SELECT COUNT(DISTINCT account_id)
            FROM check_in_logs
            WHERE success = 1 AND created_at >= ?1 AND created_at < ?2
        "#;

        let (count,): (i64,) = self
            .base
            .fetch_one(
                sqlx::query_as(query).bind(from).bind(to),
                "Count successful accounts",
            )
            .await?;

        Ok(count)
    }
}
