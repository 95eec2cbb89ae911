//! Bounded-parallelism task runner
//!
//! This module handles:
//! - Spawning one task per work item
//! - Global concurrency limiting via a semaphore
//! - Waiting for every task, even after failures
//! - Reporting the first failure, tagged with its item

use crate::crawler::context::ScrapeContext;
use crate::ScrapeError;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Runs a task per item with at most `max_concurrency` running at once
///
/// Unlike fail-fast groups, a failing task never cancels its siblings;
/// whether to cancel is up to whoever owns the context.
#[derive(Debug, Clone, Copy)]
pub struct TaskGroup {
    max_concurrency: usize,
}

impl TaskGroup {
    /// Creates a task group
    ///
    /// A `max_concurrency` of zero is treated as one.
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Runs `task` for every item and waits for all of them
    ///
    /// Items beyond the concurrency limit queue until a running task
    /// finishes. Each task receives a clone of `ctx`.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Every task succeeded
    /// * `Err(ScrapeError::TaskFailed)` - The first failure observed, wrapping
    ///   the item's identity and its error
    /// * `Err(ScrapeError::TaskAborted)` - The first observed failure was a
    ///   task that panicked, tagged with its item
    pub async fn run<T, F, Fut>(
        &self,
        ctx: &ScrapeContext,
        items: Vec<T>,
        task: F,
    ) -> Result<(), ScrapeError>
    where
        T: Display + Send + 'static,
        F: Fn(ScrapeContext, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ScrapeError>> + Send + 'static,
    {
        let total = items.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let task = Arc::new(task);
        let mut join_set = JoinSet::new();

        for item in items {
            let semaphore = Arc::clone(&semaphore);
            let task = Arc::clone(&task);
            let ctx = ctx.clone();

            join_set.spawn(async move {
                let label = item.to_string();

                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return Err(ScrapeError::TaskAborted {
                            item: label,
                            message: format!("concurrency limiter closed: {}", e),
                        })
                    }
                };

                // The body runs as its own task so a panic is caught here,
                // where the item is still known. Dropping `body` aborts it.
                let mut body = JoinSet::new();
                body.spawn(task(ctx, item));

                match body.join_next().await {
                    Some(Ok(Ok(()))) | None => Ok(()),
                    Some(Ok(Err(source))) => Err(ScrapeError::TaskFailed {
                        item: label,
                        source: Box::new(source),
                    }),
                    Some(Err(e)) => Err(ScrapeError::TaskAborted {
                        item: label,
                        message: e.to_string(),
                    }),
                }
            });
        }

        let mut first_error = None;
        let mut failures = 0usize;

        while let Some(joined) = join_set.join_next().await {
            let result = joined.unwrap_or_else(|e| {
                Err(ScrapeError::TaskAborted {
                    item: "<unknown>".to_string(),
                    message: e.to_string(),
                })
            });

            if let Err(err) = result {
                failures += 1;
                tracing::warn!("{}", err);
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }

        if failures > 0 {
            tracing::info!("{} of {} tasks failed", failures, total);
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
