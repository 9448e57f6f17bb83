//! Bounded per-symbol fan-out
//!
//! Every symbol becomes one spawned task; a semaphore created for the batch
//! caps how many run at once. The whole batch is awaited before anything is
//! returned, and each task's outcome is kept as a `Result` so one symbol's
//! failure (or panic) never aborts the others.

use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

use crate::constants::WORKER_POOL_SIZE;
use crate::services::quote_source::QuoteError;

/// Outcome of one fan-out batch, in input order
#[derive(Debug)]
pub struct FanOutReport<T> {
    pub successes: Vec<(String, T)>,
    pub failures: Vec<(String, QuoteError)>,
}

impl<T> FanOutReport<T> {
    pub fn total(&self) -> usize {
        self.successes.len() + self.failures.len()
    }
}

/// Fixed-size pool, instantiated per aggregation call
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    size: usize,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(WORKER_POOL_SIZE)
    }
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        Self { size: size.max(1) }
    }

    /// Run `task` once per symbol and wait for all of them
    pub async fn run<T, F, Fut>(&self, label: &str, symbols: &[String], task: F) -> FanOutReport<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, QuoteError>> + Send + 'static,
        T: Send + 'static,
    {
        let started = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.size));

        let handles: Vec<_> = symbols
            .iter()
            .map(|symbol| {
                let semaphore = semaphore.clone();
                let symbol = symbol.clone();
                let fut = task(symbol.clone());
                tokio::spawn(async move {
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(e) => return Err(QuoteError::Http(format!("worker pool closed: {}", e))),
                    };
                    fut.await
                })
            })
            .collect();

        let results = join_all(handles).await;

        let mut report = FanOutReport {
            successes: Vec::with_capacity(symbols.len()),
            failures: Vec::new(),
        };

        for (symbol, joined) in symbols.iter().zip(results) {
            match joined {
                Ok(Ok(value)) => report.successes.push((symbol.clone(), value)),
                Ok(Err(e)) => {
                    tracing::debug!(task = label, symbol = %symbol, error = %e, "Symbol task failed");
                    report.failures.push((symbol.clone(), e));
                }
                Err(e) => {
                    tracing::error!(task = label, symbol = %symbol, error = %e, "Task join error");
                    report
                        .failures
                        .push((symbol.clone(), QuoteError::InvalidResponse(format!("task aborted: {}", e))));
                }
            }
        }

        tracing::info!(
            task = label,
            symbols = symbols.len(),
            succeeded = report.successes.len(),
            failed = report.failures.len(),
            pool_size = self.size,
            duration_s = started.elapsed().as_secs_f64(),
            "Fan-out completed"
        );

        report
    }
}
