use chrono::{DateTime, FixedOffset, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use super::task_spawner::TimerLoop;
use super::types::ScheduledEntry;
use super::SchedulerError;
use crate::application::services::{RunError, RunReport};
use anycheckin_domain::shared::TaskId;
use anycheckin_domain::task::Task;

impl super::TaskScheduler {
    /// Arms `task`, replacing any earlier registration of the same id.
    ///
    /// Disabled tasks and unparseable expressions are refused and leave the
    /// task unregistered. Returns the next fire time, which is also stored
    /// as the task's `next_run`.
    #[instrument(skip(self, task), fields(task_id = %task.id(), cron = %task.cron_expr()))]
    pub async fn register(&self, task: &Task) -> Result<DateTime<FixedOffset>, SchedulerError> {
        let id = task.id();
        // Held through persistence: the stored `next_run` matches the armed entry.
        let mut entries = self.entries.lock().await;

        if let Some(old) = entries.remove(&id) {
            info!("🔄 Replacing schedule '{}' of task {}", old.cron_expr, id);
            old.handle.abort();
        }

        if !task.is_enabled() {
            return Err(SchedulerError::TaskDisabled(id));
        }

        let schedule = task.schedule()?;
        let next = schedule.next_after(&self.clock.now())?;

        let handle = TimerLoop {
            task_id: id,
            task_name: task.name().to_string(),
            schedule,
            first_fire: next,
            clock: Arc::clone(&self.clock),
            runner: Arc::clone(&self.runner),
            pool: self.pool.clone(),
        }
        .spawn();

        entries.insert(
            id,
            ScheduledEntry {
                cron_expr: task.cron_expr().to_string(),
                handle,
            },
        );

        info!(
            "✅ Task '{}' scheduled, next run {}",
            task.name(),
            next.format("%Y-%m-%d %H:%M:%S %:z")
        );
        self.persist_next_run(id, next).await;
        drop(entries);
        Ok(next)
    }

    /// Disarms a task. Unknown ids are ignored.
    pub async fn unregister(&self, id: TaskId) -> bool {
        match self.entries.lock().await.remove(&id) {
            Some(entry) => {
                entry.handle.abort();
                info!("⏹️  Task {} unscheduled", id);
                true
            }
            None => false,
        }
    }

    /// Runs a task once through the worker pool, armed or not.
    pub fn trigger(&self, id: TaskId) -> JoinHandle<Result<RunReport, RunError>> {
        info!("▶️  Manual run of task {} requested", id);
        let runner = Arc::clone(&self.runner);
        self.pool.submit(async move { runner.run(id).await })
    }

    /// Registers every enabled task in storage. Tasks that cannot be armed
    /// are logged and skipped. Returns how many were armed.
    pub async fn start(&self) -> Result<usize, SchedulerError> {
        let tasks = self.task_repo.list_enabled().await?;
        info!("🔄 Loading {} enabled task(s)", tasks.len());

        let mut armed = 0;
        for task in &tasks {
            match self.register(task).await {
                Ok(_) => armed += 1,
                Err(e) => warn!("⚠️  Skipping task '{}' ({}): {}", task.name(), task.id(), e),
            }
        }

        info!("✅ Scheduler started with {} task(s)", armed);
        Ok(armed)
    }

    /// Disarms every task, then waits for runs already in progress.
    pub async fn stop(&self) {
        {
            let mut entries = self.entries.lock().await;
            info!("🛑 Stopping {} scheduled task(s)...", entries.len());
            for (id, entry) in entries.drain() {
                info!("  ⏹️  Stopping task {}", id);
                entry.handle.abort();
            }
        }

        self.pool.wait_idle().await;
        info!("✅ Scheduler stopped");
    }

    async fn persist_next_run(&self, id: TaskId, next: DateTime<FixedOffset>) {
        let result = match self.task_repo.find_by_id(id).await {
            Ok(Some(mut stored)) => {
                stored.set_next_run(Some(next.with_timezone(&Utc)));
                self.task_repo.save(&stored).await
            }
            Ok(None) => return,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!("Failed to store next run of task {}: {}", id, e);
        }
    }
}
