use crate::chunk::chunk;
use crate::config::BatchConfig;
use crate::error::{BatchError, BatchResult, RequestError};
use crate::retry::RetryPolicy;
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Runs requests with bounded parallelism and retries transient failures.
///
/// At most `max_parallel_requests` requests are in flight across all clones
/// of one executor. Waiting requests are admitted in submission order. A
/// permit is held only while a request runs, never during a backoff sleep.
#[derive(Debug, Clone)]
pub struct BatchExecutor {
    config: BatchConfig,
    policy: RetryPolicy,
    permits: Arc<Semaphore>,
}

impl BatchExecutor {
    pub fn new(config: BatchConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_parallel_requests.max(1)));
        let policy = RetryPolicy::new(config.retry.clone());
        Self {
            config,
            policy,
            permits,
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Requests that could start right now without queueing.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Runs `request` until it succeeds, fails with a non-retryable error,
    /// or the retry budget is spent.
    ///
    /// `request` is called once per attempt.
    pub async fn execute<T, F, Fut>(&self, mut request: F) -> BatchResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RequestError>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let outcome = {
                let _permit = self
                    .permits
                    .acquire()
                    .await
                    .map_err(|_| RequestError::Transport("executor closed".to_string()))?;
                request().await
            };

            let error = match outcome {
                Ok(value) => return Ok(value),
                Err(error) if !self.policy.is_retryable(&error) => {
                    debug!(attempt, "request failed permanently: {error}");
                    return Err(BatchError::Request(error));
                }
                Err(error) => error,
            };

            let Some(retry) = self.policy.retry_context(attempt) else {
                warn!(attempts = attempt, "giving up on request: {error}");
                return Err(BatchError::RetriesExhausted {
                    attempts: attempt,
                    source: error,
                });
            };
            warn!(
                attempt = retry.attempt,
                delay_ms = retry.delay.as_millis() as u64,
                "retrying request: {error}"
            );
            tokio::time::sleep(retry.delay).await;
        }
    }

    /// Applies `request` to every item, one chunk of `chunk_size` at a time.
    ///
    /// Members of a chunk run concurrently and the whole chunk is awaited.
    /// The first failure (in item order) fails the call and later chunks
    /// are not started. Results keep input order.
    pub async fn execute_chunks<T, R, F, Fut>(&self, items: Vec<T>, request: F) -> BatchResult<Vec<R>>
    where
        T: Clone,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<R, RequestError>>,
    {
        let request = &request;
        let mut results = Vec::with_capacity(items.len());
        for members in chunk(items, self.config.chunk_size) {
            debug!(size = members.len(), "dispatching chunk");
            let outcomes = join_all(
                members
                    .into_iter()
                    .map(|item| self.execute(move || request(item.clone()))),
            )
            .await;
            for outcome in outcomes {
                results.push(outcome?);
            }
        }
        Ok(results)
    }
}

impl Default for BatchExecutor {
    fn default() -> Self {
        Self::new(BatchConfig::default())
    }
}
