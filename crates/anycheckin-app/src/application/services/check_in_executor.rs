use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::Clock;
use anycheckin_domain::account::{Account, AccountRepository};
use anycheckin_domain::check_in::{CheckInLog, CheckInLogRepository, CheckInOutcome};
use anycheckin_domain::notification::CheckInNotifier;
use anycheckin_domain::shared::AccountId;
use anycheckin_infrastructure::http::SiteClient;

pub const ACCOUNT_DISABLED_MESSAGE: &str = "account disabled";

/// Result of one account's check-in attempt
#[derive(Debug, Clone, Serialize)]
pub struct AccountOutcome {
    pub account_id: AccountId,
    pub account_name: String,
    pub success: bool,
    pub message: String,
}

/// Runs the check-in pipeline for one account: call the site, classify the
/// reply, record it and notify.
///
/// Failures of any step end up in the returned outcome; nothing here is
/// allowed to abort a caller iterating over many accounts.
pub struct CheckInExecutor {
    account_repo: Arc<dyn AccountRepository>,
    log_repo: Arc<dyn CheckInLogRepository>,
    site: Arc<SiteClient>,
    notifier: Arc<dyn CheckInNotifier>,
    clock: Arc<dyn Clock>,
}

impl CheckInExecutor {
    pub fn new(
        account_repo: Arc<dyn AccountRepository>,
        log_repo: Arc<dyn CheckInLogRepository>,
        site: Arc<SiteClient>,
        notifier: Arc<dyn CheckInNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            account_repo,
            log_repo,
            site,
            notifier,
            clock,
        }
    }

    #[instrument(skip(self, account), fields(account_id = %account.id(), account = %account.name()))]
    pub async fn execute(&self, mut account: Account) -> AccountOutcome {
        if !account.is_enabled() {
            warn!("[{}] Skipping disabled account", account.name());
            let outcome = CheckInOutcome::failure(ACCOUNT_DISABLED_MESSAGE);
            self.notify(&account, &outcome).await;
            return Self::to_result(&account, outcome);
        }

        info!("[{}] Starting check-in", account.name());

        let outcome = match self.site.check_in(account.session()).await {
            Ok(raw) => {
                let outcome = CheckInOutcome::from_response(raw);
                account.record_check_in(self.clock.now().with_timezone(&Utc), &outcome);
                if let Err(e) = self.account_repo.save(&account).await {
                    error!("[{}] Failed to save check-in result: {}", account.name(), e);
                }
                outcome
            }
            Err(e) => {
                error!("[{}] Check-in request failed: {}", account.name(), e);
                CheckInOutcome::failure(e.to_string())
            }
        };

        let log = CheckInLog::new(account.id(), &outcome, self.clock.now().with_timezone(&Utc));
        if let Err(e) = self.log_repo.append(&log).await {
            error!("[{}] Failed to record check-in log: {}", account.name(), e);
        }

        if outcome.success {
            info!("✅ [{}] Check-in succeeded", account.name());
        } else {
            warn!("❌ [{}] Check-in failed: {}", account.name(), outcome.message);
        }

        self.notify(&account, &outcome).await;
        Self::to_result(&account, outcome)
    }

    async fn notify(&self, account: &Account, outcome: &CheckInOutcome) {
        if let Err(e) = self
            .notifier
            .notify(account.name(), outcome.success, &outcome.message)
            .await
        {
            warn!("[{}] Notification failed: {}", account.name(), e);
        }
    }

    fn to_result(account: &Account, outcome: CheckInOutcome) -> AccountOutcome {
        AccountOutcome {
            account_id: account.id(),
            account_name: account.name().to_string(),
            success: outcome.success,
            message: outcome.message,
        }
    }
}
