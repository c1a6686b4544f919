use chrono::{Duration, FixedOffset, TimeZone, Utc};
use serde::Serialize;
use std::sync::Arc;

use super::Clock;
use anycheckin_domain::account::AccountRepository;
use anycheckin_domain::check_in::{CheckInLog, CheckInLogRepository};
use anycheckin_domain::notification::CheckInNotifier;
use anycheckin_domain::shared::DomainError;

#[derive(Debug, Clone, Serialize)]
pub struct LogSummary {
    pub logs: Vec<CheckInLog>,
    /// Distinct accounts with a successful check-in since local midnight
    pub today_success_accounts: i64,
}

pub struct CheckInLogService {
    log_repo: Arc<dyn CheckInLogRepository>,
    account_repo: Arc<dyn AccountRepository>,
    notifier: Arc<dyn CheckInNotifier>,
    clock: Arc<dyn Clock>,
}

impl CheckInLogService {
    pub fn new(
        log_repo: Arc<dyn CheckInLogRepository>,
        account_repo: Arc<dyn AccountRepository>,
        notifier: Arc<dyn CheckInNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            log_repo,
            account_repo,
            notifier,
            clock,
        }
    }

    pub async fn summary(&self, limit: i64) -> Result<LogSummary, DomainError> {
        let logs = self.log_repo.list_recent(limit).await?;

        let now = self.clock.now();
        let offset: FixedOffset = *now.offset();
        let midnight = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .and_then(|dt| offset.from_local_datetime(&dt).single())
            .ok_or_else(|| DomainError::Validation("Cannot compute start of day".to_string()))?;
        let start = midnight.with_timezone(&Utc);
        let end = start + Duration::days(1);

        let today_success_accounts = self
            .log_repo
            .count_successful_accounts_between(start, end)
            .await?;

        Ok(LogSummary {
            logs,
            today_success_accounts,
        })
    }

    /// Re-sends the newest successful check-in through the notifier.
    pub async fn send_test_notification(&self) -> Result<(), DomainError> {
        let log = self
            .log_repo
            .find_latest_successful()
            .await?
            .ok_or_else(|| DomainError::NotFound("No successful check-in yet".to_string()))?;

        let name = match self.account_repo.find_by_id(log.account_id()).await {
            Ok(Some(account)) if !account.name().is_empty() => account.name().to_string(),
            _ => format!("账号ID:{}", log.account_id()),
        };

        self.notifier
            .notify(&name, log.is_success(), log.message())
            .await
    }
}
