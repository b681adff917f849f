use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinError;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no result within {0:?}")]
    TimedOut(Duration),

    #[error("worker pool is closed")]
    Closed,

    #[error("worker task failed: {0}")]
    Worker(#[from] JoinError),
}

/// Fixed number of slots for remote calls.
///
/// A job first waits for a slot, then runs as its own task holding that slot
/// until it finishes. The caller's timeout covers both the wait and the run.
/// If the timeout fires while the job is running, the job keeps its slot
/// until it completes and its result is dropped. A job still queued when the
/// timeout fires never starts.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    slots: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            slots: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Slots not currently held by a running job.
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }

    pub async fn run<F, T>(&self, job: F, timeout: Duration) -> Result<T, DispatchError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let slots = Arc::clone(&self.slots);
        let wait = async move {
            let permit = slots
                .acquire_owned()
                .await
                .map_err(|_| DispatchError::Closed)?;
            let handle = tokio::spawn(async move {
                let _permit = permit;
                job.await
            });
            handle.await.map_err(DispatchError::Worker)
        };

        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| DispatchError::TimedOut(timeout))?
    }
}
