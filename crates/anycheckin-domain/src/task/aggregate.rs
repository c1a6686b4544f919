use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CronSchedule, ScheduleError};
use crate::shared::{AccountId, DomainError, TaskId};

/// A persisted check-in job: which accounts to sign in and when.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    name: String,
    cron_expr: String,
    account_ids: Vec<AccountId>,
    enabled: bool,
    last_run: Option<DateTime<Utc>>,
    next_run: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(
        name: String,
        cron_expr: String,
        account_ids: Vec<AccountId>,
    ) -> Result<Self, DomainError> {
        let name = validate_name(&name)?;
        Ok(Self {
            id: TaskId::UNSAVED,
            name,
            cron_expr: cron_expr.trim().to_string(),
            account_ids: dedup(account_ids),
            enabled: true,
            last_run: None,
            next_run: None,
            created_at: Utc::now(),
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: TaskId,
        name: String,
        cron_expr: String,
        account_ids: Vec<AccountId>,
        enabled: bool,
        last_run: Option<DateTime<Utc>>,
        next_run: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            cron_expr,
            account_ids,
            enabled,
            last_run,
            next_run,
            created_at,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cron_expr(&self) -> &str {
        &self.cron_expr
    }

    pub fn account_ids(&self) -> &[AccountId] {
        &self.account_ids
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn last_run(&self) -> Option<DateTime<Utc>> {
        self.last_run
    }

    pub fn next_run(&self) -> Option<DateTime<Utc>> {
        self.next_run
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn schedule(&self) -> Result<CronSchedule, ScheduleError> {
        CronSchedule::parse(&self.cron_expr)
    }

    pub fn update(
        &mut self,
        name: String,
        cron_expr: String,
        account_ids: Vec<AccountId>,
    ) -> Result<(), DomainError> {
        self.name = validate_name(&name)?;
        self.cron_expr = cron_expr.trim().to_string();
        self.account_ids = dedup(account_ids);
        Ok(())
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.next_run = None;
        }
    }

    pub fn set_next_run(&mut self, next_run: Option<DateTime<Utc>>) {
        self.next_run = next_run;
    }

    pub fn record_run(&mut self, at: DateTime<Utc>, next_run: Option<DateTime<Utc>>) {
        self.last_run = Some(at);
        self.next_run = next_run;
    }
}

fn validate_name(name: &str) -> Result<String, DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(
            "Task name cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

// Keeps the first occurrence of each id
fn dedup(ids: Vec<AccountId>) -> Vec<AccountId> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
