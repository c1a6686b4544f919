use std::future::Future;
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

/// Bounded, supervised pool for task runs.
///
/// At most `max_concurrent` submitted futures make progress at once; the
/// rest wait for a permit. All of them are tracked so shutdown can wait for
/// in-flight work.
#[derive(Clone)]
pub struct RunPool {
    tracker: TaskTracker,
    permits: Arc<Semaphore>,
    completed: Arc<watch::Sender<u64>>,
}

impl RunPool {
    pub fn new(max_concurrent: usize) -> Self {
        let (completed, _) = watch::channel(0);
        Self {
            tracker: TaskTracker::new(),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            completed: Arc::new(completed),
        }
    }

    pub fn submit<F>(&self, job: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        let completed = Arc::clone(&self.completed);
        self.tracker.spawn(async move {
            // The semaphore is never closed, so a permit always arrives
            let _permit = permits.acquire_owned().await.ok();
            let output = job.await;
            completed.send_modify(|count| *count += 1);
            output
        })
    }

    /// Jobs currently queued or running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Total number of jobs that have finished.
    pub fn completed(&self) -> u64 {
        *self.completed.borrow()
    }

    /// Waits until at least `count` jobs have finished in total.
    pub async fn wait_for_completed(&self, count: u64) {
        let mut rx = self.completed.subscribe();
        let _ = rx.wait_for(|done| *done >= count).await;
    }

    /// Waits for every job submitted so far.
    pub async fn wait_idle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}
