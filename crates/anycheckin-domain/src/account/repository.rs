use async_trait::async_trait;

use super::Account;
use crate::shared::{AccountId, DomainError};

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Inserts a new account and returns it with its storage id.
    async fn create(&self, account: &Account) -> Result<Account, DomainError>;
    async fn save(&self, account: &Account) -> Result<(), DomainError>;
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, DomainError>;
    async fn list(&self) -> Result<Vec<Account>, DomainError>;
    async fn delete(&self, id: AccountId) -> Result<(), DomainError>;
}
