use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters of one sync run.
///
/// Every draft is counted once as processed, even if it is parked and synced
/// again later. A parked draft is neither created nor failed until it is
/// picked up.
#[derive(Debug, Default)]
pub struct SyncStatistics {
    processed: AtomicUsize,
    created: AtomicUsize,
    updated: AtomicUsize,
    failed: AtomicUsize,
    deferred: AtomicUsize,
}

impl SyncStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_processed(&self, n: usize) {
        self.processed.fetch_add(n, Ordering::Relaxed);
    }

    pub fn increment_created(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_updated(&self) {
        self.updated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed(&self, n: usize) {
        self.failed.fetch_add(n, Ordering::Relaxed);
    }

    pub fn increment_deferred(&self) {
        self.deferred.fetch_add(1, Ordering::Relaxed);
    }

    /// A parked draft was picked up again.
    pub fn decrement_deferred(&self) {
        let _ = self
            .deferred
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    pub fn updated(&self) -> usize {
        self.updated.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }

    /// Drafts currently parked because of missing references.
    pub fn deferred(&self) -> usize {
        self.deferred.load(Ordering::Relaxed)
    }

    pub fn report_message(&self) -> String {
        format!(
            "Summary: {} resources were processed in total ({} created, {} updated and {} failed to sync).",
            self.processed(),
            self.created(),
            self.updated(),
            self.failed()
        )
    }
}
