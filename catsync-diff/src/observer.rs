use crate::error::DiffError;
use parking_lot::Mutex;

/// Receives non-fatal findings while a diff is computed.
///
/// Both methods are fire-and-forget.
pub trait DiffObserver: Send + Sync {
    /// An item was skipped; the rest of the diff is unaffected.
    fn warning(&self, message: &str) {
        let _ = message;
    }

    /// One item of a collection could not be diffed; its actions were dropped.
    fn error(&self, error: &DiffError) {
        let _ = error;
    }
}

/// Discards every finding.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl DiffObserver for NoopObserver {}

/// Keeps every finding in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    warnings: Mutex<Vec<String>>,
    errors: Mutex<Vec<DiffError>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().clone()
    }

    pub fn errors(&self) -> Vec<DiffError> {
        self.errors.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.lock().is_empty() && self.errors.lock().is_empty()
    }
}

impl DiffObserver for RecordingObserver {
    fn warning(&self, message: &str) {
        self.warnings.lock().push(message.to_string());
    }

    fn error(&self, error: &DiffError) {
        self.errors.lock().push(error.clone());
    }
}
