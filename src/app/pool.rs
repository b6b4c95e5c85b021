//! Bounded worker pool
//!
//! A fixed number of workers pull jobs from a shared queue until it drains;
//! [`WorkerPool::run`] returns only after every worker has joined, which is
//! the phase barrier the coordinator relies on between the download and
//! upload rounds.
//!
//! Jobs within a round are independent and may complete in any order; the
//! result vector carries no ordering guarantee.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Fixed-size pool of concurrent execution slots
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    worker_count: usize,
}

impl WorkerPool {
    /// Create a pool with the given number of slots (minimum 1)
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count: worker_count.max(1),
        }
    }

    /// Number of concurrent slots
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Run every job to completion with bounded concurrency
    ///
    /// Dispatches `jobs` to `worker_count` workers and joins them all before
    /// returning. A handler that sleeps (e.g. a retry backoff) occupies its
    /// slot for the duration.
    pub async fn run<J, R, F, Fut>(&self, jobs: Vec<J>, handler: F) -> Vec<R>
    where
        J: Send + 'static,
        R: Send + 'static,
        F: Fn(J) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        let total = jobs.len();
        let queue = Arc::new(Mutex::new(VecDeque::from(jobs)));
        let mut handles = Vec::with_capacity(self.worker_count);

        debug!(
            "Dispatching {} jobs across {} workers",
            total, self.worker_count
        );

        for worker_id in 0..self.worker_count {
            let queue = Arc::clone(&queue);
            let handler = handler.clone();

            handles.push(tokio::spawn(async move {
                let mut results = Vec::new();
                loop {
                    let job = queue.lock().await.pop_front();
                    match job {
                        Some(job) => results.push(handler(job).await),
                        None => break,
                    }
                }
                debug!("Worker {} drained the queue", worker_id);
                results
            }));
        }

        // Join every worker: the barrier between phases
        let mut all_results = Vec::with_capacity(total);
        for handle in handles {
            match handle.await {
                Ok(results) => all_results.extend(results),
                Err(e) => warn!("Worker panicked: {}", e),
            }
        }
        all_results
    }
}
