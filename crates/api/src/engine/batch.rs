//! "Wait for all, collect each outcome" join for generation batches.
//!
//! Batch generation issues N independent calls concurrently and must not
//! fail fast on the first error: the outcome of every call is collected
//! and the caller decides what a partial result means. This is the
//! explicit primitive for that, instead of per-call error suppression.

use std::future::Future;

use futures::future::join_all;

/// Outcomes of a settled batch, split by result.
#[derive(Debug)]
pub struct BatchOutcome<T, E> {
    pub successes: Vec<T>,
    pub failures: Vec<E>,
}

impl<T, E> BatchOutcome<T, E> {
    pub fn all_failed(&self) -> bool {
        self.successes.is_empty()
    }
}

/// Drive every future to completion concurrently and partition the results.
pub async fn join_settled<T, E, F>(futures: impl IntoIterator<Item = F>) -> BatchOutcome<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    let mut outcome = BatchOutcome {
        successes: Vec::new(),
        failures: Vec::new(),
    };
    for result in join_all(futures).await {
        match result {
            Ok(value) => outcome.successes.push(value),
            Err(err) => outcome.failures.push(err),
        }
    }
    outcome
}
