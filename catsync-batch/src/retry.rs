//! Exponential backoff with jitter.

use crate::config::RetryConfig;
use crate::error::RequestError;
use rand::Rng;
use std::time::Duration;

/// State of one pending retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryContext {
    /// The attempt that just failed, starting at 1.
    pub attempt: u32,
    /// Wait before the next attempt.
    pub delay: Duration,
}

/// Decides whether and when a failed request is retried.
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// True if `error` carries one of the configured transient statuses.
    /// Version conflicts are never retried.
    pub fn is_retryable(&self, error: &RequestError) -> bool {
        !error.is_conflict()
            && error
                .status()
                .is_some_and(|status| self.config.retryable_statuses.contains(&status))
    }

    /// Context for retrying after failed attempt `attempt`, or `None` once
    /// the retry budget is spent.
    pub fn retry_context(&self, attempt: u32) -> Option<RetryContext> {
        (attempt <= self.config.max_retries).then(|| RetryContext {
            attempt,
            delay: self.delay_for_attempt(attempt),
        })
    }

    /// `min(initial × 2^(attempt−1) × jitter, timeout)` with jitter drawn
    /// uniformly from `[1, 2)`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let jitter = rand::thread_rng().gen_range(1.0..2.0);
        self.delay_with_jitter(attempt, jitter)
    }

    /// Same as [`delay_for_attempt`](Self::delay_for_attempt) with a fixed jitter factor.
    pub fn delay_with_jitter(&self, attempt: u32, jitter: f64) -> Duration {
        let exponent = attempt.saturating_sub(1).min(63) as i32;
        let delay = self.config.initial_delay_ms as f64 * 2f64.powi(exponent) * jitter;
        let ceiling = self.config.timeout_ms as f64;
        Duration::from_millis(delay.min(ceiling) as u64)
    }
}
