use async_trait::async_trait;

use super::Task;
use crate::shared::{DomainError, TaskId};

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Inserts a new task and returns it with its storage id.
    async fn create(&self, task: &Task) -> Result<Task, DomainError>;
    async fn save(&self, task: &Task) -> Result<(), DomainError>;
    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, DomainError>;
    async fn list(&self) -> Result<Vec<Task>, DomainError>;
    async fn list_enabled(&self) -> Result<Vec<Task>, DomainError>;
    async fn delete(&self, id: TaskId) -> Result<(), DomainError>;
}
