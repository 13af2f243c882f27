//! Garbage collection of stale deferred records.

use crate::client::{KeyValueClient, PageRequest, Query};
use crate::error::{DeferredError, DeferredResult};
use catsync_batch::BatchExecutor;
use chrono::{DateTime, TimeDelta, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const CATEGORY_CONTAINER: &str = "catsync.deferred.categoryDrafts";
pub const PRODUCT_CONTAINER: &str = "catsync.deferred.productDrafts";
pub const STATE_CONTAINER: &str = "catsync.deferred.stateDrafts";

/// Every container the sync engine parks drafts in.
pub const DEFAULT_CONTAINERS: [&str; 3] = [CATEGORY_CONTAINER, PRODUCT_CONTAINER, STATE_CONTAINER];

/// Outcome of a cleanup run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupStatistics {
    pub deleted: usize,
    pub failed: usize,
}

impl CleanupStatistics {
    pub fn report_message(&self) -> String {
        format!(
            "Summary: {} deferred records were deleted in total ({} failed to delete).",
            self.deleted, self.failed
        )
    }
}

impl AddAssign for CleanupStatistics {
    fn add_assign(&mut self, other: Self) {
        self.deleted += other.deleted;
        self.failed += other.failed;
    }
}

type ErrorCallback = Arc<dyn Fn(&DeferredError) + Send + Sync>;

/// Deletes deferred records that have not been touched for a number of days.
///
/// A failed deletion is logged, counted and handed to the error callback; it
/// never stops the sweep.
#[derive(Clone)]
pub struct Cleanup {
    client: Arc<dyn KeyValueClient>,
    executor: BatchExecutor,
    page_size: usize,
    error_callback: Option<ErrorCallback>,
}

impl Cleanup {
    pub fn new(client: Arc<dyn KeyValueClient>, executor: BatchExecutor) -> Self {
        Self {
            client,
            executor,
            page_size: 500,
            error_callback: None,
        }
    }

    /// Called with the cause of every failed deletion.
    #[must_use]
    pub fn with_error_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&DeferredError) + Send + Sync + 'static,
    {
        self.error_callback = Some(Arc::new(callback));
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Sweeps every container in `containers`, summing the statistics.
    pub async fn run<S: AsRef<str>>(
        &self,
        containers: &[S],
        max_age_days: i64,
    ) -> DeferredResult<CleanupStatistics> {
        let mut total = CleanupStatistics::default();
        for container in containers {
            total += self.run_container(container.as_ref(), max_age_days).await?;
        }
        info!("{}", total.report_message());
        Ok(total)
    }

    /// Sweeps one container.
    ///
    /// Records last modified more than `max_age_days` days ago are deleted.
    /// A negative age selects every record. Records that vanish before they
    /// are deleted count neither as deleted nor as failed.
    pub async fn run_container(
        &self,
        container: &str,
        max_age_days: i64,
    ) -> DeferredResult<CleanupStatistics> {
        let query = Query::LastModifiedBefore(stale_before(max_age_days));
        let mut stats = CleanupStatistics::default();

        loop {
            // Failed records stay in the container; skip past them.
            let page = PageRequest {
                limit: self.page_size,
                offset: stats.failed,
            };
            let entries = self
                .executor
                .execute(|| self.client.query(container, &query, page))
                .await
                .map_err(|source| DeferredError::Request {
                    operation: "query",
                    container: container.to_string(),
                    key: query.to_predicate(),
                    source,
                })?;
            if entries.is_empty() {
                break;
            }
            debug!(container, count = entries.len(), "deleting stale records");

            let outcomes = join_all(entries.iter().map(|entry| {
                self.executor
                    .execute(|| self.client.delete(container, &entry.key))
            }))
            .await;
            for (entry, outcome) in entries.iter().zip(outcomes) {
                match outcome {
                    Ok(_) => stats.deleted += 1,
                    Err(error) if error.is_not_found() => {}
                    Err(source) => {
                        warn!(container, key = %entry.key, "failed to delete deferred record: {source}");
                        stats.failed += 1;
                        if let Some(callback) = &self.error_callback {
                            callback(&DeferredError::Request {
                                operation: "delete",
                                container: container.to_string(),
                                key: entry.key.clone(),
                                source,
                            });
                        }
                    }
                }
            }

            if entries.len() < self.page_size {
                break;
            }
        }
        Ok(stats)
    }
}

/// Cutoff for records older than `max_age_days`. A negative age selects
/// every record; an age beyond the calendar range selects none.
fn stale_before(max_age_days: i64) -> DateTime<Utc> {
    if max_age_days < 0 {
        return DateTime::<Utc>::MAX_UTC;
    }
    TimeDelta::try_days(max_age_days)
        .and_then(|age| Utc::now().checked_sub_signed(age))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
