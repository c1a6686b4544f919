use std::sync::Arc;
use tracing::info;

use super::{AccountOutcome, CheckInExecutor};
use anycheckin_domain::account::{Account, AccountRepository};
use anycheckin_domain::session::{decode_session, SessionInfo};
use anycheckin_domain::shared::{AccountId, DomainError};
use anycheckin_infrastructure::http::SiteClient;

/// Session value meaning "keep the stored session" on update
pub const SESSION_UNCHANGED: &str = "unchanged";

pub struct AccountService {
    account_repo: Arc<dyn AccountRepository>,
    site: Arc<SiteClient>,
    executor: Arc<CheckInExecutor>,
}

impl AccountService {
    pub fn new(
        account_repo: Arc<dyn AccountRepository>,
        site: Arc<SiteClient>,
        executor: Arc<CheckInExecutor>,
    ) -> Self {
        Self {
            account_repo,
            site,
            executor,
        }
    }

    /// Decodes a session without storing anything.
    pub fn verify(session: &str) -> Result<SessionInfo, DomainError> {
        decode_session(session).map_err(|e| DomainError::InvalidSession(e.to_string()))
    }

    pub async fn create(&self, name: String, session: String) -> Result<Account, DomainError> {
        let identity = Self::verify(&session)?;
        let account = Account::new(name, session, &identity)?;
        let created = self.account_repo.create(&account).await?;
        info!(
            "✅ Account '{}' added for site user {} ({})",
            created.name(),
            identity.user_id,
            identity.username
        );
        Ok(created)
    }

    /// Updates name and/or session. An empty session or `"unchanged"` keeps
    /// the stored one.
    pub async fn update(
        &self,
        id: AccountId,
        name: Option<String>,
        session: Option<String>,
    ) -> Result<Account, DomainError> {
        let mut account = self.get(id).await?;

        if let Some(name) = name {
            account.rename(name)?;
        }

        if let Some(session) = session
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && s != SESSION_UNCHANGED)
        {
            let identity = Self::verify(&session)?;
            account.replace_session(session, &identity);
        }

        self.account_repo.save(&account).await?;
        Ok(account)
    }

    pub async fn set_enabled(&self, id: AccountId, enabled: bool) -> Result<Account, DomainError> {
        let mut account = self.get(id).await?;
        account.set_enabled(enabled);
        self.account_repo.save(&account).await?;
        info!(
            "Account '{}' {}",
            account.name(),
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(account)
    }

    pub async fn delete(&self, id: AccountId) -> Result<(), DomainError> {
        self.account_repo.delete(id).await
    }

    pub async fn list(&self) -> Result<Vec<Account>, DomainError> {
        self.account_repo.list().await
    }

    pub async fn get(&self, id: AccountId) -> Result<Account, DomainError> {
        self.account_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::AccountNotFound(id.to_string()))
    }

    /// Checks in a single account through the same pipeline task runs use.
    pub async fn check_in(&self, id: AccountId) -> Result<AccountOutcome, DomainError> {
        let account = self.get(id).await?;
        Ok(self.executor.execute(account).await)
    }

    /// Reloads identity and balance from the site.
    pub async fn refresh(&self, id: AccountId) -> Result<Account, DomainError> {
        let mut account = self.get(id).await?;
        if !account.is_enabled() {
            return Err(DomainError::AccountDisabled(account.name().to_string()));
        }

        let profile = self
            .site
            .fetch_self(account.session(), account.user_id())
            .await?;
        account.update_profile(profile.user_id, profile.username, profile.role, profile.balance);
        self.account_repo.save(&account).await?;

        info!(
            "✅ Account '{}' refreshed, balance {:.2}",
            account.name(),
            profile.balance
        );
        Ok(account)
    }
}
