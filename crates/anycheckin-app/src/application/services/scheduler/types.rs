use tokio::task::JoinHandle;

use anycheckin_domain::shared::{DomainError, TaskId};
use anycheckin_domain::task::ScheduleError;

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("invalid cron expression '{expr}': {reason}")]
    InvalidCron { expr: String, reason: String },

    #[error("task {0} is disabled")]
    TaskDisabled(TaskId),

    #[error("storage error: {0}")]
    Storage(#[from] DomainError),
}

impl From<ScheduleError> for SchedulerError {
    fn from(error: ScheduleError) -> Self {
        match error {
            ScheduleError::InvalidCron { expr, reason } => SchedulerError::InvalidCron { expr, reason },
            ScheduleError::NoUpcomingOccurrence(expr) => SchedulerError::InvalidCron {
                expr,
                reason: "no upcoming occurrence".to_string(),
            },
        }
    }
}

impl From<SchedulerError> for DomainError {
    fn from(error: SchedulerError) -> Self {
        match error {
            SchedulerError::Storage(inner) => inner,
            SchedulerError::InvalidCron { .. } => DomainError::InvalidSchedule(error.to_string()),
            SchedulerError::TaskDisabled(_) => DomainError::Validation(error.to_string()),
        }
    }
}

/// One armed timer loop
pub(super) struct ScheduledEntry {
    pub cron_expr: String,
    pub handle: JoinHandle<()>,
}
