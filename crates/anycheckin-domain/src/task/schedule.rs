use chrono::{DateTime, TimeZone};
use croner::Cron;
use std::fmt;
use std::sync::Arc;

/// Number of whitespace-separated fields in an accepted expression:
/// minute, hour, day-of-month, month, day-of-week.
pub const CRON_FIELDS: usize = 5;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("invalid cron expression '{expr}': {reason}")]
    InvalidCron { expr: String, reason: String },

    #[error("cron expression '{0}' has no upcoming occurrence")]
    NoUpcomingOccurrence(String),
}

/// A parsed five-field cron expression.
///
/// Predefined descriptors (`@daily`, `@hourly`, ...) are accepted too.
#[derive(Clone)]
pub struct CronSchedule {
    expr: String,
    cron: Arc<Cron>,
}

impl CronSchedule {
    pub fn parse(expr: &str) -> Result<Self, ScheduleError> {
        let trimmed = expr.trim();
        let invalid = |reason: String| ScheduleError::InvalidCron {
            expr: expr.to_string(),
            reason,
        };

        if !trimmed.starts_with('@') {
            let fields = trimmed.split_whitespace().count();
            if fields != CRON_FIELDS {
                return Err(invalid(format!(
                    "expected {} fields, found {}",
                    CRON_FIELDS, fields
                )));
            }
        }

        let cron = Cron::new(trimmed)
            .parse()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            expr: trimmed.to_string(),
            cron: Arc::new(cron),
        })
    }

    pub fn expr(&self) -> &str {
        &self.expr
    }

    /// First occurrence strictly after `after`, in the same time zone.
    pub fn next_after<Tz: TimeZone>(
        &self,
        after: &DateTime<Tz>,
    ) -> Result<DateTime<Tz>, ScheduleError> {
        self.cron
            .find_next_occurrence(after, false)
            .map_err(|_| ScheduleError::NoUpcomingOccurrence(self.expr.clone()))
    }
}

impl fmt::Debug for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CronSchedule").field(&self.expr).finish()
    }
}
