use crate::cleanup::{Cleanup, CleanupStatistics};
use crate::client::{KeyValueClient, PageRequest, Query, StoredEntry};
use crate::error::{DeferredError, DeferredResult};
use crate::record::{hash_key, DeferredDraft, DeferredRecord, StoredValue};
use catsync_batch::{chunk, BatchExecutor};
use std::collections::BTreeSet;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

/// Persists drafts whose referenced resources do not exist yet.
///
/// Records are keyed by the SHA-1 hex digest of the draft's natural key, so
/// saving the same draft again overwrites the previous record. The store
/// keeps no local state; concurrent saves of one key are settled by the
/// backend.
pub struct DeferredStore<D> {
    client: Arc<dyn KeyValueClient>,
    executor: BatchExecutor,
    container: String,
    page_size: usize,
    _draft: PhantomData<fn() -> D>,
}

impl<D: DeferredDraft> DeferredStore<D> {
    pub fn new(client: Arc<dyn KeyValueClient>, executor: BatchExecutor, container: impl Into<String>) -> Self {
        Self {
            client,
            executor,
            container: container.into(),
            page_size: 500,
            _draft: PhantomData,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    /// Upserts `draft` together with the keys it is waiting for.
    pub async fn save(&self, draft: &D, missing_keys: &BTreeSet<String>) -> DeferredResult<DeferredRecord<D>> {
        let natural_key = draft
            .natural_key()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| DeferredError::MissingKey {
                container: self.container.clone(),
            })?;
        let value = serde_json::to_value(StoredValue {
            draft,
            missing_referenced_keys: missing_keys.clone(),
        })
        .map_err(|source| DeferredError::Encode {
            key: natural_key.to_string(),
            source,
        })?;

        let hashed = hash_key(natural_key);
        let entry = self
            .executor
            .execute(|| self.client.upsert(&self.container, &hashed, value.clone()))
            .await
            .map_err(|source| self.request_error("save", natural_key, source))?;
        debug!(container = %self.container, key = natural_key, "parked draft");

        Ok(DeferredRecord {
            key: entry.key,
            draft: draft.clone(),
            missing_keys: missing_keys.clone(),
            last_modified_at: entry.last_modified_at,
            version: entry.version,
        })
    }

    /// Fetches the records of the given natural keys. Unknown keys are
    /// absent from the result.
    pub async fn fetch(&self, natural_keys: &BTreeSet<String>) -> DeferredResult<Vec<DeferredRecord<D>>> {
        if natural_keys.is_empty() {
            return Ok(Vec::new());
        }
        let hashed: Vec<String> = natural_keys.iter().map(|key| hash_key(key)).collect();
        let page_size = self.page_size;
        let pages = self
            .executor
            .execute_chunks(chunk(hashed, page_size), |keys| {
                let client = self.client.clone();
                let container = self.container.clone();
                async move {
                    client
                        .query(&container, &Query::KeysIn(keys), PageRequest::first(page_size))
                        .await
                }
            })
            .await
            .map_err(|source| self.request_error("fetch", &format!("{} keys", natural_keys.len()), source))?;

        Ok(pages.into_iter().flatten().filter_map(|entry| self.decode(entry)).collect())
    }

    /// Removes the record of `natural_key`. A record that does not exist is
    /// not an error.
    pub async fn delete(&self, natural_key: &str) -> DeferredResult<Option<DeferredRecord<D>>> {
        let hashed = hash_key(natural_key);
        match self
            .executor
            .execute(|| self.client.delete(&self.container, &hashed))
            .await
        {
            Ok(entry) => Ok(self.decode(entry)),
            Err(error) if error.is_not_found() => Ok(None),
            Err(source) => Err(self.request_error("delete", natural_key, source)),
        }
    }

    /// Deletes this store's records older than `max_age_days` days.
    pub async fn cleanup(&self, max_age_days: i64) -> DeferredResult<CleanupStatistics> {
        Cleanup::new(self.client.clone(), self.executor.clone())
            .with_page_size(self.page_size)
            .run_container(&self.container, max_age_days)
            .await
    }

    fn decode(&self, entry: StoredEntry) -> Option<DeferredRecord<D>> {
        match serde_json::from_value::<StoredValue<D>>(entry.value) {
            Ok(value) => Some(DeferredRecord {
                key: entry.key,
                draft: value.draft,
                missing_keys: value.missing_referenced_keys,
                last_modified_at: entry.last_modified_at,
                version: entry.version,
            }),
            Err(error) => {
                warn!(container = %self.container, key = %entry.key, "skipping undecodable record: {error}");
                None
            }
        }
    }

    fn request_error(&self, operation: &'static str, key: &str, source: catsync_batch::BatchError) -> DeferredError {
        DeferredError::Request {
            operation,
            container: self.container.clone(),
            key: key.to_string(),
            source,
        }
    }
}
