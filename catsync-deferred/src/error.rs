//! Deferred store error types.

use catsync_batch::BatchError;
use thiserror::Error;

/// Result type for deferred store operations.
pub type DeferredResult<T> = Result<T, DeferredError>;

#[derive(Debug, Error)]
pub enum DeferredError {
    /// The draft to park has no natural key, so it cannot be addressed.
    #[error("Failed to save draft in container '{container}': draft has no key.")]
    MissingKey { container: String },

    #[error("Failed to encode deferred draft with key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to {operation} deferred draft with key '{key}' in container '{container}': {source}")]
    Request {
        operation: &'static str,
        container: String,
        key: String,
        #[source]
        source: BatchError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}
