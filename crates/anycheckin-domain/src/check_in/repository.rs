use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::CheckInLog;
use crate::shared::{AccountId, DomainError};

#[async_trait]
pub trait CheckInLogRepository: Send + Sync {
    /// Appends a record; returns it with its storage id.
    async fn append(&self, log: &CheckInLog) -> Result<CheckInLog, DomainError>;
    /// Most recent records first.
    async fn list_recent(&self, limit: i64) -> Result<Vec<CheckInLog>, DomainError>;
    async fn list_by_account(
        &self,
        account_id: AccountId,
        limit: i64,
    ) -> Result<Vec<CheckInLog>, DomainError>;
    /// Newest successful record, if any.
    async fn find_latest_successful(&self) -> Result<Option<CheckInLog>, DomainError>;
    /// Distinct accounts with at least one successful record in `[from, to)`.
    async fn count_successful_accounts_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64, DomainError>;
}
