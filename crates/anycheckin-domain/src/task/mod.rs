mod aggregate;
mod repository;
mod schedule;

pub use aggregate::Task;
pub use repository::TaskRepository;
pub use schedule::{CronSchedule, ScheduleError};
