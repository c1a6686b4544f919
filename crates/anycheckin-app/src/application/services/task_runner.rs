use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use super::{AccountOutcome, CheckInExecutor, Clock};
use anycheckin_domain::account::AccountRepository;
use anycheckin_domain::shared::{AccountId, DomainError, TaskId};
use anycheckin_domain::task::TaskRepository;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    #[error("storage error: {0}")]
    Storage(#[from] DomainError),
}

/// What one execution of a task did.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub task_id: TaskId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<AccountOutcome>,
    /// Listed accounts that no longer exist
    pub skipped: Vec<AccountId>,
    pub next_run: Option<DateTime<Utc>>,
    /// Set when `last_run`/`next_run` could not be stored
    pub persist_error: Option<String>,
}

impl RunReport {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }
}

/// Executes a task: checks in every listed account, then records the run.
///
/// Runs of the same task are serialized; different tasks run concurrently.
pub struct TaskRunner {
    task_repo: Arc<dyn TaskRepository>,
    account_repo: Arc<dyn AccountRepository>,
    executor: Arc<CheckInExecutor>,
    clock: Arc<dyn Clock>,
    task_locks: Mutex<HashMap<TaskId, Arc<Mutex<()>>>>,
}

impl TaskRunner {
    pub fn new(
        task_repo: Arc<dyn TaskRepository>,
        account_repo: Arc<dyn AccountRepository>,
        executor: Arc<CheckInExecutor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            task_repo,
            account_repo,
            executor,
            clock,
            task_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn task_lock(&self, id: TaskId) -> Arc<Mutex<()>> {
        let mut locks = self.task_locks.lock().await;
        Arc::clone(locks.entry(id).or_default())
    }

    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn run(&self, id: TaskId) -> Result<RunReport, RunError> {
        let lock = self.task_lock(id).await;
        let _guard = lock.lock().await;

        let task = self
            .task_repo
            .find_by_id(id)
            .await?
            .ok_or(RunError::TaskNotFound(id))?;

        let started_at = self.clock.now().with_timezone(&Utc);
        info!(
            "⏰ Running task '{}' for {} account(s)",
            task.name(),
            task.account_ids().len()
        );

        let mut outcomes = Vec::with_capacity(task.account_ids().len());
        let mut skipped = Vec::new();

        for &account_id in task.account_ids() {
            let account = match self.account_repo.find_by_id(account_id).await {
                Ok(Some(account)) => account,
                Ok(None) => {
                    warn!("Account {} listed by task '{}' not found, skipping", account_id, task.name());
                    skipped.push(account_id);
                    continue;
                }
                Err(e) => {
                    error!("Failed to load account {}: {}", account_id, e);
                    outcomes.push(AccountOutcome {
                        account_id,
                        account_name: account_id.to_string(),
                        success: false,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            outcomes.push(self.executor.execute(account).await);
        }

        let finished_at = self.clock.now();
        let (next_run, persist_error) = self.record_run(id, finished_at.with_timezone(&Utc)).await;

        let report = RunReport {
            task_id: id,
            started_at,
            finished_at: finished_at.with_timezone(&Utc),
            outcomes,
            skipped,
            next_run,
            persist_error,
        };

        info!(
            "✅ Task '{}' finished: {}/{} succeeded",
            task.name(),
            report.success_count(),
            report.outcomes.len()
        );

        Ok(report)
    }

    /// Stores `last_run` and the next fire time. The task is reloaded so
    /// edits made while the run was in progress are kept.
    async fn record_run(
        &self,
        id: TaskId,
        at: DateTime<Utc>,
    ) -> (Option<DateTime<Utc>>, Option<String>) {
        let mut task = match self.task_repo.find_by_id(id).await {
            Ok(Some(task)) => task,
            Ok(None) => {
                warn!("Task {} was deleted during its run", id);
                return (None, Some(format!("task {} no longer exists", id)));
            }
            Err(e) => {
                error!("Failed to reload task {}: {}", id, e);
                return (None, Some(e.to_string()));
            }
        };

        let now = self.clock.now();
        let next_run = match task.schedule().and_then(|s| s.next_after(&now)) {
            Ok(next) if task.is_enabled() => Some(next.with_timezone(&Utc)),
            Ok(_) => None,
            Err(e) => {
                warn!("Cannot compute next run for task {}: {}", id, e);
                None
            }
        };

        task.record_run(at, next_run);
        match self.task_repo.save(&task).await {
            Ok(()) => (next_run, None),
            Err(e) => {
                error!("Failed to save run of task {}: {}", id, e);
                (next_run, Some(e.to_string()))
            }
        }
    }
}
