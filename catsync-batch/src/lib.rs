//! Batch execution for catsync.
//!
//! Bulk platform operations (fetching by key, deleting deferred records,
//! applying updates) go through a [`BatchExecutor`], which:
//!
//! - splits work into ordered chunks ([`chunk`])
//! - caps the number of requests in flight, queueing the rest in order
//! - retries transient failures (5xx by default) with exponential backoff
//!   and jitter, sleeping on the runtime timer
//!
//! [`BatchExecutor::execute_chunks`] is fail-fast: one failed request fails
//! the call. Callers that must keep going past individual failures run each
//! item through [`BatchExecutor::execute`] and count the outcomes themselves.

mod chunk;
mod config;
mod error;
mod executor;
mod retry;

pub use chunk::chunk;
pub use config::{BatchConfig, RetryConfig};
pub use error::{BatchError, BatchResult, RequestError};
pub use executor::BatchExecutor;
pub use retry::{RetryContext, RetryPolicy};
