pub mod account_repo;
pub mod check_in_log_repo;
pub mod task_repo;

pub use account_repo::SqliteAccountRepository;
pub use check_in_log_repo::SqliteCheckInLogRepository;
pub use task_repo::SqliteTaskRepository;
