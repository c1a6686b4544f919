use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::security::EncryptionService;
use anycheckin_domain::account::Account;
use anycheckin_domain::shared::{AccountId, DomainError};

#[derive(FromRow)]
pub(super) struct AccountRow {
    pub id: i64,
    pub name: String,
    pub session: String,
    pub user_id: i64,
    pub username: String,
    pub role: i64,
    pub enabled: bool,
    pub balance: Option<f64>,
    pub last_check_in: Option<DateTime<Utc>>,
    pub last_result: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountRow {
    #[allow(clippy::wrong_self_convention)]
    pub fn to_account(self, encryption: &EncryptionService) -> Result<Account, DomainError> {
        // No plaintext fallback: a session that fails to decrypt is corrupt
        // or was written under another key.
        let session = encryption.decrypt(&self.session).map_err(|e| {
            DomainError::DataIntegrity(format!(
                "Failed to decrypt session for account {}: {}",
                self.id, e
            ))
        })?;

        Ok(Account::restore(
            AccountId::new(self.id),
            self.name,
            session,
            self.user_id,
            self.username,
            self.role,
            self.enabled,
            self.balance,
            self.last_check_in,
            self.last_result,
            self.created_at,
            self.updated_at,
        ))
    }
}
