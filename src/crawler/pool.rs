//! Bounded, paced worker pool for one page's items
//!
//! This module handles:
//! - A work queue holding the page's items in extraction order
//! - Pacing: a fixed delay before every launch after the first
//! - A global concurrency limit via a semaphore
//! - Draining: waiting for every launched worker before the page advances
//! - Stopping early when the run is cancelled

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Counts for one batch
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolReport {
    /// Workers started
    pub launched: usize,
    /// Workers that ran to completion
    pub completed: usize,
    /// Workers that panicked or were aborted
    pub panicked: usize,
    /// Items never launched because the run was cancelled
    pub skipped: usize,
}

/// Workers launched for one page, not yet drained
pub struct LaunchedBatch {
    workers: JoinSet<()>,
    report: PoolReport,
}

impl LaunchedBatch {
    pub fn launched(&self) -> usize {
        self.report.launched
    }

    /// Waits for every launched worker to finish
    pub async fn drain(mut self) -> PoolReport {
        while let Some(result) = self.workers.join_next().await {
            match result {
                Ok(()) => self.report.completed += 1,
                Err(e) => {
                    tracing::error!("Item worker did not finish: {}", e);
                    self.report.panicked += 1;
                }
            }
        }
        self.report
    }
}

/// Scheduler for a page's item downloaders
///
/// At most `limit` workers are in flight at once, and successive launches are
/// at least `launch_delay` apart. The delay gates launches, not completions,
/// so workers may overlap.
#[derive(Debug, Clone)]
pub struct ItemPool {
    limit: usize,
    launch_delay: Duration,
    cancel: CancellationToken,
}

impl ItemPool {
    /// Creates a new pool
    ///
    /// # Arguments
    ///
    /// * `limit` - Maximum concurrent workers (values below 1 are raised to 1)
    /// * `launch_delay` - Pause before each launch after the first
    /// * `cancel` - Stops further launches when cancelled
    pub fn new(limit: usize, launch_delay: Duration, cancel: CancellationToken) -> Self {
        Self {
            limit: limit.max(1),
            launch_delay,
            cancel,
        }
    }

    /// Launches one worker per item, in order, without waiting for them
    ///
    /// `task` is called at launch time with the dequeued item; the future it
    /// returns runs on its own tokio task while holding a concurrency permit.
    pub async fn launch<T, F, Fut>(&self, items: Vec<T>, task: F) -> LaunchedBatch
    where
        T: Send + 'static,
        F: Fn(T) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.limit));
        let mut queue: VecDeque<T> = items.into();
        let mut workers = JoinSet::new();
        let mut report = PoolReport::default();

        while let Some(item) = queue.pop_front() {
            if self.cancel.is_cancelled() {
                report.skipped = queue.len() + 1;
                break;
            }

            // Pacing happens at dequeue time
            if report.launched > 0
                && self
                    .until_cancelled(tokio::time::sleep(self.launch_delay))
                    .await
                    .is_none()
            {
                report.skipped = queue.len() + 1;
                break;
            }

            let permit = match self
                .until_cancelled(semaphore.clone().acquire_owned())
                .await
            {
                Some(Ok(permit)) => permit,
                _ => {
                    report.skipped = queue.len() + 1;
                    break;
                }
            };

            let work = task(item);
            workers.spawn(async move {
                work.await;
                drop(permit);
            });
            report.launched += 1;
        }

        if report.skipped > 0 {
            tracing::warn!(
                "Cancelled: {} item(s) not launched",
                report.skipped
            );
        }

        LaunchedBatch { workers, report }
    }

    /// Launches every item and waits for all of them
    pub async fn run<T, F, Fut>(&self, items: Vec<T>, task: F) -> PoolReport
    where
        T: Send + 'static,
        F: Fn(T) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.launch(items, task).await.drain().await
    }

    async fn until_cancelled<Fut: Future>(&self, fut: Fut) -> Option<Fut::Output> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            output = fut => Some(output),
        }
    }
}
