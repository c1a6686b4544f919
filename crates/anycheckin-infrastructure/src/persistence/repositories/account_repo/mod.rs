mod types;

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::persistence::SqliteRepositoryBase;
use crate::security::EncryptionService;
use anycheckin_domain::account::{Account, AccountRepository};
use anycheckin_domain::shared::{AccountId, DomainError};
use types::AccountRow;

/// Accounts table; the session cookie is stored AES-GCM encrypted.
pub struct SqliteAccountRepository {
    base: SqliteRepositoryBase,
    encryption: Arc<EncryptionService>,
}

impl SqliteAccountRepository {
    const SELECT_QUERY: &'static str = r#"
            SELECT
                id, name, session, user_id, username, role, enabled, balance,
                last_check_in, last_result, created_at, updated_at
            FROM accounts
        "#;

    pub fn new(pool: Arc<SqlitePool>, encryption: Arc<EncryptionService>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
            encryption,
        }
    }

    fn encrypt_session(&self, account: &Account) -> Result<String, DomainError> {
        self.encryption
            .encrypt(account.session())
            .map_err(|e| DomainError::DataIntegrity(format!("Failed to encrypt session: {}", e)))
    }
}

#[async_trait]
impl AccountRepository for SqliteAccountRepository {
    async fn create(&self, account: &Account) -> Result<Account, DomainError> {
        let query = r#"
            INSERT INTO accounts (
                name, session, user_id, username, role, enabled, balance,
                last_check_in, last_result, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#;

        let result = self
            .base
            .execute(
                sqlx::query(query)
                    .bind(account.name())
                    .bind(self.encrypt_session(account)?)
                    .bind(account.user_id())
                    .bind(account.username())
                    .bind(account.role())
                    .bind(account.is_enabled())
                    .bind(account.balance())
                    .bind(account.last_check_in())
                    .bind(account.last_result())
                    .bind(account.created_at())
                    .bind(account.updated_at()),
                "Create account",
            )
            .await?;

        let id = AccountId::new(result.last_insert_rowid());
        info!("✅ Account {} created (id {})", account.name(), id);

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::AccountNotFound(id.to_string()))
    }

    async fn save(&self, account: &Account) -> Result<(), DomainError> {
        let query = r#"
            UPDATE accounts SET
                name = ?2,
                session = ?3,
                user_id = ?4,
                username = ?5,
                role = ?6,
                enabled = ?7,
                balance = ?8,
                last_check_in = ?9,
                last_result = ?10,
                updated_at = ?11
            WHERE id = ?1
        "#;

        let result = self
            .base
            .execute(
                sqlx::query(query)
                    .bind(account.id().value())
                    .bind(account.name())
                    .bind(self.encrypt_session(account)?)
                    .bind(account.user_id())
                    .bind(account.username())
                    .bind(account.role())
                    .bind(account.is_enabled())
                    .bind(account.balance())
                    .bind(account.last_check_in())
                    .bind(account.last_result())
                    .bind(account.updated_at()),
                "Save account",
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::AccountNotFound(account.id().to_string()));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, DomainError> {
        let query = format!("{} WHERE id = ?1", Self::SELECT_QUERY);

        let row: Option<AccountRow> = self
            .base
            .fetch_optional(sqlx::query_as(&query).bind(id.value()), "Find account by ID")
            .await?;

        row.map(|row| row.to_account(&self.encryption)).transpose()
    }

    async fn list(&self) -> Result<Vec<Account>, DomainError> {
        let start = Instant::now();
        let query = format!("{} ORDER BY id", Self::SELECT_QUERY);

        let rows: Vec<AccountRow> = self
            .base
            .fetch_all(sqlx::query_as(&query), "List accounts")
            .await?;
        let count = rows.len();

        // One undecryptable row must not hide the others.
        let accounts: Vec<Account> = rows
            .into_iter()
            .filter_map(|row| match row.to_account(&self.encryption) {
                Ok(account) => Some(account),
                Err(e) => {
                    tracing::error!("Failed to load account: {}", e);
                    None
                }
            })
            .collect();

        info!(
            "📊 list(): {:.2}ms, {}/{} accounts loaded",
            start.elapsed().as_secs_f64() * 1000.0,
            accounts.len(),
            count
        );

        Ok(accounts)
    }

    async fn delete(&self, id: AccountId) -> Result<(), DomainError> {
        let result = self
            .base
            .execute(
                sqlx::query("DELETE FROM accounts WHERE id = ?1").bind(id.value()),
                "Delete account",
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::AccountNotFound(id.to_string()));
        }
        Ok(())
    }
}
