//! Batch execution error types.

use thiserror::Error;

/// Result type for batch operations.
pub type BatchResult<T> = Result<T, BatchError>;

/// Failure of one request against the platform.
///
/// Produced by the collaborator that performs the request (resource client,
/// key-value client); the executor only inspects [`RequestError::status`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("version conflict (current version: {current_version:?}): {message}")]
    Conflict {
        current_version: Option<u64>,
        message: String,
    },

    #[error("server responded with status {status}: {message}")]
    Server { status: u16, message: String },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("invalid request: {0}")]
    Invalid(String),
}

impl RequestError {
    /// HTTP status equivalent of this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::NotFound(_) => Some(404),
            RequestError::Conflict { .. } => Some(409),
            RequestError::Server { status, .. } => Some(*status),
            RequestError::Transport(_) | RequestError::Invalid(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RequestError::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, RequestError::Conflict { .. })
    }
}

/// Errors returned by the [`BatchExecutor`](crate::BatchExecutor).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// A non-retryable failure, returned on the attempt that produced it.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Every allowed attempt failed with a retryable error.
    #[error("request failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: RequestError,
    },
}

impl BatchError {
    /// The request failure behind this error.
    pub fn request(&self) -> &RequestError {
        match self {
            BatchError::Request(error) => error,
            BatchError::RetriesExhausted { source, .. } => source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.request().is_not_found()
    }

    pub fn is_conflict(&self) -> bool {
        self.request().is_conflict()
    }
}
