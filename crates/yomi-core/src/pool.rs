use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Bounded pool for resolve and preload tasks.
///
/// Every task is tied to the pool's cancellation token; `shutdown` cancels
/// whatever is still queued or running.
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl WorkerPool {
    pub fn new(size: usize, cancel: CancellationToken) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(size.max(1))),
            tracker: TaskTracker::new(),
            cancel,
        }
    }

    pub fn spawn<F>(&self, name: &'static str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let permits = self.permits.clone();
        let cancel = self.cancel.clone();

        self.tracker.spawn(async move {
            let _permit = tokio::select! {
                permit = permits.acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return,
                },
                _ = cancel.cancelled() => return,
            };

            tokio::select! {
                _ = task => {}
                _ = cancel.cancelled() => {
                    tracing::debug!("{} task cancelled", name);
                }
            }
        });
    }

    /// Tasks queued or running
    pub fn active(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel all tasks and wait up to `timeout` for them to finish.
    /// Returns false on timeout.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.cancel.cancel();
        self.tracker.close();
        tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .is_ok()
    }
}
