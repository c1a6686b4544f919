use std::sync::Arc;

use crate::application::services::{
    AccountService, CheckInLogService, TaskScheduler, TaskService,
};
use anycheckin_domain::account::AccountRepository;
use anycheckin_domain::check_in::CheckInLogRepository;
use anycheckin_domain::task::TaskRepository;
use anycheckin_infrastructure::persistence::Database;

pub struct Repositories {
    pub account: Arc<dyn AccountRepository>,
    pub task: Arc<dyn TaskRepository>,
    pub check_in_log: Arc<dyn CheckInLogRepository>,
}

pub struct Services {
    pub account: Arc<AccountService>,
    pub task: Arc<TaskService>,
    pub check_in_log: Arc<CheckInLogService>,
    pub scheduler: Arc<TaskScheduler>,
}

pub struct AppState {
    pub db: Arc<Database>,
    pub repositories: Repositories,
    pub services: Services,
}
