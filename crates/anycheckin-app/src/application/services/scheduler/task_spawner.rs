use chrono::{DateTime, FixedOffset};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::RunPool;
use crate::application::services::{Clock, TaskRunner};
use anycheckin_domain::shared::TaskId;
use anycheckin_domain::task::CronSchedule;

/// Everything a timer loop needs, moved into its tokio task
pub(super) struct TimerLoop {
    pub task_id: TaskId,
    pub task_name: String,
    pub schedule: CronSchedule,
    pub first_fire: DateTime<FixedOffset>,
    pub clock: Arc<dyn Clock>,
    pub runner: Arc<TaskRunner>,
    pub pool: RunPool,
}

impl TimerLoop {
    /// Sleeps until each occurrence and submits one run per fire. The loop
    /// never waits for the run itself; the runner serializes overlaps.
    pub fn spawn(self) -> JoinHandle<()> {
        let TimerLoop {
            task_id,
            task_name,
            schedule,
            first_fire,
            clock,
            runner,
            pool,
        } = self;

        tokio::spawn(async move {
            let mut next = first_fire;
            loop {
                clock.sleep_until(next).await;

                info!(
                    "⏰ [SCHEDULED] Firing task '{}' ({}) for {}",
                    task_name,
                    task_id,
                    next.format("%Y-%m-%d %H:%M:%S %:z")
                );

                let runner = Arc::clone(&runner);
                pool.submit(async move {
                    if let Err(e) = runner.run(task_id).await {
                        error!("❌ [SCHEDULED] Task {} failed: {}", task_id, e);
                    }
                });

                next = match schedule.next_after(&next) {
                    Ok(next) => next,
                    Err(e) => {
                        error!("❌ Task '{}' has no further occurrences: {}", task_name, e);
                        break;
                    }
                };
            }
        })
    }
}
