//! Error types for the sync layer.

use catsync_batch::BatchError;
use catsync_deferred::DeferredError;
use catsync_diff::DiffError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Failures reported while syncing drafts.
///
/// Every variant names the resource kind and, where one exists, the key of
/// the draft it concerns. Most are handed to the error callback rather than
/// returned, so one bad draft never stops a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A draft without a key cannot be matched.
    #[error("{kind} draft at position {position} has no key. Please make sure all drafts have keys.")]
    MissingDraftKey { kind: &'static str, position: usize },

    /// Only the first draft with a given key in a batch is synced.
    #[error("{kind} draft with key '{key}' appears more than once in the batch. Only the first one is synced.")]
    DuplicateDraftKey { kind: &'static str, key: String },

    #[error("Failed to resolve references on {kind} with key '{key}'. Reason: {source}")]
    ReferenceResolution {
        kind: &'static str,
        key: String,
        #[source]
        source: BatchError,
    },

    #[error("Failed to fetch existing {kind} resources with keys: '{keys}'. Reason: {source}")]
    Fetch {
        kind: &'static str,
        keys: String,
        #[source]
        source: BatchError,
    },

    #[error("Failed to create {kind} with key '{key}'. Reason: {source}")]
    Create {
        kind: &'static str,
        key: String,
        #[source]
        source: BatchError,
    },

    /// Includes version conflicts; those are never retried by the engine.
    #[error("Failed to update {kind} with key '{key}'. Reason: {source}")]
    Update {
        kind: &'static str,
        key: String,
        #[source]
        source: BatchError,
    },

    #[error("Failed to build update actions for {kind} with key '{key}'. Reason: {source}")]
    BuildActions {
        kind: &'static str,
        key: String,
        #[source]
        source: DiffError,
    },

    /// Referenced resources are missing and no deferred store is configured.
    #[error("Failed to sync {kind} with key '{key}': referenced resources do not exist: {missing}.")]
    MissingReferences {
        kind: &'static str,
        key: String,
        missing: String,
    },

    #[error("Failed to park {kind} with key '{key}' until its references exist. Reason: {source}")]
    Deferred {
        kind: &'static str,
        key: String,
        #[source]
        source: DeferredError,
    },
}

impl SyncError {
    /// True if the platform rejected an update because the resource changed
    /// in the meantime.
    pub fn is_conflict(&self) -> bool {
        matches!(self, SyncError::Update { source, .. } if source.is_conflict())
    }
}
