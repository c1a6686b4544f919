use std::sync::Arc;
use tracing::info;

use super::{RunError, RunReport, TaskScheduler};
use anycheckin_domain::account::AccountRepository;
use anycheckin_domain::shared::{AccountId, DomainError, TaskId};
use anycheckin_domain::task::{CronSchedule, Task, TaskRepository};

/// Fields accepted when creating or updating a task
#[derive(Debug, Clone)]
pub struct TaskInput {
    pub name: String,
    pub cron_expr: String,
    pub account_ids: Vec<AccountId>,
    pub enabled: bool,
}

pub struct TaskService {
    task_repo: Arc<dyn TaskRepository>,
    account_repo: Arc<dyn AccountRepository>,
    scheduler: Arc<TaskScheduler>,
}

impl TaskService {
    pub fn new(
        task_repo: Arc<dyn TaskRepository>,
        account_repo: Arc<dyn AccountRepository>,
        scheduler: Arc<TaskScheduler>,
    ) -> Self {
        Self {
            task_repo,
            account_repo,
            scheduler,
        }
    }

    async fn validate(&self, input: &TaskInput) -> Result<(), DomainError> {
        CronSchedule::parse(&input.cron_expr)
            .map_err(|e| DomainError::InvalidSchedule(e.to_string()))?;

        for &id in &input.account_ids {
            if self.account_repo.find_by_id(id).await?.is_none() {
                return Err(DomainError::AccountNotFound(id.to_string()));
            }
        }
        Ok(())
    }

    pub async fn create(&self, input: TaskInput) -> Result<Task, DomainError> {
        self.validate(&input).await?;

        let mut task = Task::new(input.name, input.cron_expr, input.account_ids)?;
        task.set_enabled(input.enabled);
        let created = self.task_repo.create(&task).await?;
        info!("✅ Task '{}' created ({})", created.name(), created.id());

        if created.is_enabled() {
            self.scheduler.register(&created).await?;
        }
        self.get(created.id()).await
    }

    /// Applies `input`, then re-arms the task if it is enabled or disarms
    /// it otherwise.
    pub async fn update(&self, id: TaskId, input: TaskInput) -> Result<Task, DomainError> {
        self.validate(&input).await?;

        let mut task = self.get(id).await?;
        task.update(input.name, input.cron_expr, input.account_ids)?;
        task.set_enabled(input.enabled);
        self.task_repo.save(&task).await?;

        if task.is_enabled() {
            self.scheduler.register(&task).await?;
        } else {
            self.scheduler.unregister(id).await;
        }
        self.get(id).await
    }

    pub async fn set_enabled(&self, id: TaskId, enabled: bool) -> Result<Task, DomainError> {
        let task = self.get(id).await?;
        let input = TaskInput {
            name: task.name().to_string(),
            cron_expr: task.cron_expr().to_string(),
            account_ids: task.account_ids().to_vec(),
            enabled,
        };
        self.update(id, input).await
    }

    pub async fn delete(&self, id: TaskId) -> Result<(), DomainError> {
        self.scheduler.unregister(id).await;
        self.task_repo.delete(id).await?;
        info!("🗑️  Task {} deleted", id);
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Task>, DomainError> {
        self.task_repo.list().await
    }

    pub async fn get(&self, id: TaskId) -> Result<Task, DomainError> {
        self.task_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::TaskNotFound(id.to_string()))
    }

    /// Triggers a run and waits for its report.
    pub async fn run_now(&self, id: TaskId) -> Result<RunReport, DomainError> {
        let handle = self.scheduler.trigger(id);
        match handle.await {
            Ok(Ok(report)) => Ok(report),
            Ok(Err(RunError::TaskNotFound(id))) => Err(DomainError::TaskNotFound(id.to_string())),
            Ok(Err(RunError::Storage(e))) => Err(e),
            Err(e) => Err(DomainError::Infrastructure(format!("Task run aborted: {}", e))),
        }
    }
}
