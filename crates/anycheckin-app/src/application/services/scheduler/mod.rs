//! Registry of cron-scheduled tasks.
//!
//! Each registered task owns one timer loop. Timer fires and manual
//! triggers are submitted to the same bounded [`RunPool`].

mod run_pool;
mod task_manager;
mod task_spawner;
mod types;

pub use run_pool::RunPool;
pub use types::SchedulerError;

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{Clock, TaskRunner};
use anycheckin_domain::shared::TaskId;
use anycheckin_domain::task::TaskRepository;
use types::ScheduledEntry;

pub struct TaskScheduler {
    /// Armed timer loops by task
    entries: Mutex<HashMap<TaskId, ScheduledEntry>>,
    task_repo: Arc<dyn TaskRepository>,
    runner: Arc<TaskRunner>,
    clock: Arc<dyn Clock>,
    pool: RunPool,
}

impl TaskScheduler {
    pub fn new(
        task_repo: Arc<dyn TaskRepository>,
        runner: Arc<TaskRunner>,
        clock: Arc<dyn Clock>,
        pool: RunPool,
    ) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            task_repo,
            runner,
            clock,
            pool,
        }
    }

    pub fn pool(&self) -> &RunPool {
        &self.pool
    }

    pub async fn is_registered(&self, id: TaskId) -> bool {
        self.entries.lock().await.contains_key(&id)
    }

    /// Cron expression the task is currently armed with.
    pub async fn registered_cron(&self, id: TaskId) -> Option<String> {
        self.entries
            .lock()
            .await
            .get(&id)
            .map(|entry| entry.cron_expr.clone())
    }

    pub async fn registered_count(&self) -> usize {
        self.entries.lock().await.len()
    }
}
