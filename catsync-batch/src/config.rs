use serde::{Deserialize, Serialize};

/// Retry behaviour for transient request failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt. `0` disables retrying.
    pub max_retries: u32,
    /// Base delay before the first retry.
    pub initial_delay_ms: u64,
    /// Upper bound for any single delay.
    pub timeout_ms: u64,
    /// HTTP statuses considered transient.
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay_ms: 200,
            timeout_ms: 30_000,
            retryable_statuses: vec![500, 502, 503, 504],
        }
    }
}

/// Configuration for the batch executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Requests dispatched together by `execute_chunks`.
    pub chunk_size: usize,
    /// Requests in flight at once across the executor.
    pub max_parallel_requests: usize,
    pub retry: RetryConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: 50,
            max_parallel_requests: 10,
            retry: RetryConfig::default(),
        }
    }
}
