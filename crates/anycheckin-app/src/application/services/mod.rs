mod account_service;
mod check_in_executor;
mod check_in_log_service;
mod clock;
mod scheduler;
mod task_runner;
mod task_service;

pub use account_service::AccountService;
pub use check_in_executor::{AccountOutcome, CheckInExecutor};
pub use check_in_log_service::{CheckInLogService, LogSummary};
pub use clock::{Clock, ManualClock, SystemClock};
pub use scheduler::{RunPool, SchedulerError, TaskScheduler};
pub use task_runner::{RunError, RunReport, TaskRunner};
pub use task_service::{TaskInput, TaskService};
