use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use tokio::sync::watch;

/// Time source for schedules.
///
/// Cron expressions are evaluated in the clock's offset, so the same
/// expression fires at the same wall-clock time wherever the process runs.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;

    /// Returns once `now() >= deadline`.
    async fn sleep_until(&self, deadline: DateTime<FixedOffset>);
}

/// Wall clock at a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    async fn sleep_until(&self, deadline: DateTime<FixedOffset>) {
        let remaining = (deadline - self.now()).to_std().unwrap_or_default();
        tokio::time::sleep(remaining).await;
    }
}

/// Clock that only moves when told to. Sleepers wake as soon as the clock
/// is set at or past their deadline.
#[derive(Debug)]
pub struct ManualClock {
    now: watch::Sender<DateTime<FixedOffset>>,
}

impl ManualClock {
    pub fn new(start: DateTime<FixedOffset>) -> Self {
        let (now, _) = watch::channel(start);
        Self { now }
    }

    pub fn set(&self, at: DateTime<FixedOffset>) {
        self.now.send_replace(at);
    }

    pub fn advance(&self, by: Duration) {
        self.now.send_modify(|now| *now += by);
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.now.borrow()
    }

    async fn sleep_until(&self, deadline: DateTime<FixedOffset>) {
        let mut rx = self.now.subscribe();
        // The sender lives as long as `self`, so this only ends early if the
        // clock is dropped mid-sleep.
        let _ = rx.wait_for(|now| *now >= deadline).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn at(hour: u32, minute: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 6, 1, hour, minute, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_manual_clock_wakes_on_advance() {
        let clock = Arc::new(ManualClock::new(at(7, 59)));

        let sleeper = {
            let clock = Arc::clone(&clock);
            tokio::spawn(async move { clock.sleep_until(at(8, 0)).await })
        };

        tokio::task::yield_now().await;
        assert!(!sleeper.is_finished());

        clock.advance(Duration::minutes(1));
        tokio::time::timeout(std::time::Duration::from_secs(1), sleeper)
            .await
            .expect("sleeper should wake")
            .unwrap();
        assert_eq!(clock.now(), at(8, 0));
    }

    #[tokio::test]
    async fn test_manual_clock_past_deadline_returns_immediately() {
        let clock = ManualClock::new(at(9, 0));
        tokio::time::timeout(std::time::Duration::from_secs(1), clock.sleep_until(at(8, 0)))
            .await
            .expect("deadline already passed");
    }

    #[test]
    fn test_system_clock_uses_offset() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let clock = SystemClock::new(offset);
        assert_eq!(clock.now().offset(), &offset);
    }
}
