//! Batch orchestration: key validation, reference resolution, deferral,
//! then create or update per draft.

use crate::error::SyncError;
use crate::options::SyncOptions;
use crate::resource::{ResourceClient, SyncableResource};
use crate::statistics::SyncStatistics;
use catsync_batch::{chunk, BatchError, BatchExecutor};
use catsync_cache::ReferenceCache;
use catsync_deferred::{DeferredDraft, DeferredStore, KeyValueClient};
use catsync_diff::{DiffError, DiffObserver};
use catsync_types::is_blank;
use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Default)]
struct DeferralState {
    /// Missing reference key → keys of the drafts parked on it.
    waiting: HashMap<String, BTreeSet<String>>,
    /// Draft keys already counted as processed during this run.
    seen: HashSet<String>,
}

/// Syncs drafts of one resource kind against the platform.
///
/// Drafts are handled in batches of `batch_size`. A draft whose references
/// do not exist yet is parked in the deferred store and picked up again
/// as soon as everything it references has been created.
pub struct ResourceSync<K: SyncableResource> {
    client: Arc<dyn ResourceClient<K>>,
    options: SyncOptions<K>,
    cache: Arc<ReferenceCache>,
    executor: BatchExecutor,
    deferred: Option<DeferredStore<K::Draft>>,
    statistics: SyncStatistics,
    state: Mutex<DeferralState>,
}

impl<K: SyncableResource> ResourceSync<K> {
    pub fn new(client: Arc<dyn ResourceClient<K>>, options: SyncOptions<K>) -> Self {
        let cache = Arc::new(ReferenceCache::new(options.config.cache_capacity));
        let executor = BatchExecutor::new(options.config.batch.clone());
        Self {
            client,
            options,
            cache,
            executor,
            deferred: None,
            statistics: SyncStatistics::new(),
            state: Mutex::new(DeferralState::default()),
        }
    }

    /// Shares a reference cache with other syncs.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<ReferenceCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Parks drafts with missing references in `client`. Without a store
    /// such drafts are reported as failures.
    #[must_use]
    pub fn with_deferred_store(mut self, client: Arc<dyn KeyValueClient>) -> Self {
        let container = self
            .options
            .config
            .deferred_container
            .clone()
            .unwrap_or_else(|| K::DEFERRED_CONTAINER.to_string());
        self.deferred = Some(DeferredStore::new(client, self.executor.clone(), container));
        self
    }

    pub fn cache(&self) -> &ReferenceCache {
        &self.cache
    }

    pub fn statistics(&self) -> &SyncStatistics {
        &self.statistics
    }

    pub fn options(&self) -> &SyncOptions<K> {
        &self.options
    }

    /// Syncs `drafts` and returns the accumulated statistics.
    ///
    /// Failures never abort the run; they go to the error callback and the
    /// failed counter.
    pub async fn sync(&self, drafts: Vec<K::Draft>) -> &SyncStatistics {
        for batch in chunk(drafts, self.options.config.batch_size) {
            let mut pending = batch;
            while !pending.is_empty() {
                let created = self.process_batch(pending).await;
                pending = self.take_resolvable(&created).await;
            }
        }
        info!(kind = K::KIND, "{}", self.statistics.report_message());
        &self.statistics
    }

    /// Returns the keys of the resources it created.
    async fn process_batch(&self, drafts: Vec<K::Draft>) -> Vec<String> {
        let mut valid = Vec::with_capacity(drafts.len());
        let mut batch_keys = HashSet::with_capacity(drafts.len());
        for (position, draft) in drafts.into_iter().enumerate() {
            let key = draft
                .natural_key()
                .filter(|key| !is_blank(key))
                .map(str::to_string);
            let Some(key) = key else {
                self.statistics.increment_processed(1);
                self.fail(&SyncError::MissingDraftKey { kind: K::KIND, position }, Some(&draft), None, &[]);
                continue;
            };
            if !batch_keys.insert(key.clone()) {
                self.statistics.increment_processed(1);
                self.fail(&SyncError::DuplicateDraftKey { kind: K::KIND, key }, Some(&draft), None, &[]);
                continue;
            }
            self.count_processed(&key);
            valid.push((key, draft));
        }
        if valid.is_empty() {
            return Vec::new();
        }

        let referenced: BTreeSet<String> = valid.iter().flat_map(|(_, draft)| K::referenced_keys(draft)).collect();
        if let Err(source) = self.resolve_keys(&referenced).await {
            for (key, draft) in &valid {
                let error = SyncError::ReferenceResolution {
                    kind: K::KIND,
                    key: key.clone(),
                    source: source.clone(),
                };
                self.fail(&error, Some(draft), None, &[]);
            }
            return Vec::new();
        }

        let mut ready = Vec::with_capacity(valid.len());
        for (key, draft) in valid {
            let missing: BTreeSet<String> = K::referenced_keys(&draft)
                .into_iter()
                .filter(|reference| self.cache.id_for_key(reference).is_none())
                .collect();
            if missing.is_empty() {
                self.release(&key).await;
                ready.push((key, draft));
            } else {
                self.park(key, draft, missing).await;
            }
        }
        if ready.is_empty() {
            return Vec::new();
        }

        let keys: Vec<String> = ready.iter().map(|(key, _)| key.clone()).collect();
        let existing = match self.executor.execute(|| self.client.fetch_by_keys(&keys)).await {
            Ok(existing) => existing,
            Err(source) => {
                let error = SyncError::Fetch {
                    kind: K::KIND,
                    keys: keys.join(", "),
                    source,
                };
                for (_, draft) in &ready {
                    self.fail(&error, Some(draft), None, &[]);
                }
                return Vec::new();
            }
        };
        self.cache.add_all(existing.iter().filter_map(|resource| {
            K::resource_key(resource).map(|key| (K::resource_id(resource).to_string(), key.to_string()))
        }));

        let unknown_ids: Vec<String> = existing
            .iter()
            .flat_map(K::referenced_ids)
            .filter(|id| !self.cache.contains_key(id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if !unknown_ids.is_empty() {
            match self.executor.execute(|| self.client.resolve_ids(&unknown_ids)).await {
                Ok(pairs) => self.cache.add_all(pairs),
                // Unresolved ids only make references compare as changed.
                Err(error) => warn!(kind = K::KIND, "failed to resolve referenced ids: {error}"),
            }
        }

        let mut by_key: HashMap<String, K::Resource> = existing
            .into_iter()
            .filter_map(|resource| {
                let key = K::resource_key(&resource)?.to_string();
                Some((key, resource))
            })
            .collect();

        let outcomes = join_all(ready.into_iter().map(|(key, draft)| {
            let old = by_key.remove(&key);
            async move {
                match old {
                    Some(old) => {
                        self.update(key, draft, old).await;
                        None
                    }
                    None => self.create(key, draft).await,
                }
            }
        }))
        .await;
        outcomes.into_iter().flatten().collect()
    }

    async fn create(&self, key: String, draft: K::Draft) -> Option<String> {
        let Some(draft) = self.options.apply_before_create(draft) else {
            debug!(kind = K::KIND, key = %key, "draft dropped before creation");
            return None;
        };
        match self.executor.execute(|| self.client.create(&draft)).await {
            Ok(resource) => {
                let key = K::resource_key(&resource).map_or(key, str::to_string);
                self.cache.add(K::resource_id(&resource), key.clone());
                self.statistics.increment_created();
                debug!(kind = K::KIND, key = %key, "created");
                Some(key)
            }
            Err(source) => {
                let error = SyncError::Create {
                    kind: K::KIND,
                    key,
                    source,
                };
                self.fail(&error, Some(&draft), None, &[]);
                None
            }
        }
    }

    async fn update(&self, key: String, draft: K::Draft, old: K::Resource) {
        let observer = CallbackObserver {
            options: &self.options,
            key: &key,
            draft: &draft,
            resource: &old,
        };
        let actions = match K::build_actions(&old, &draft, &self.cache, &observer) {
            Ok(actions) => actions,
            Err(source) => {
                let error = SyncError::BuildActions {
                    kind: K::KIND,
                    key,
                    source,
                };
                self.fail(&error, Some(&draft), Some(&old), &[]);
                return;
            }
        };

        let actions = self.options.apply_before_update(actions, &draft, &old);
        if actions.is_empty() {
            debug!(kind = K::KIND, key = %key, "already up to date");
            return;
        }

        match self.executor.execute(|| self.client.update(&old, &actions)).await {
            Ok(_) => {
                self.statistics.increment_updated();
                debug!(kind = K::KIND, key = %key, actions = actions.len(), "updated");
            }
            Err(source) => {
                let error = SyncError::Update {
                    kind: K::KIND,
                    key,
                    source,
                };
                self.fail(&error, Some(&draft), Some(&old), &actions);
            }
        }
    }

    async fn resolve_keys(&self, keys: &BTreeSet<String>) -> Result<(), BatchError> {
        let unknown: Vec<String> = keys
            .iter()
            .filter(|key| self.cache.id_for_key(key).is_none())
            .cloned()
            .collect();
        if unknown.is_empty() {
            return Ok(());
        }
        let pairs = self.executor.execute(|| self.client.resolve_keys(&unknown)).await?;
        self.cache.add_all(pairs);
        Ok(())
    }

    async fn park(&self, key: String, draft: K::Draft, missing: BTreeSet<String>) {
        let Some(store) = &self.deferred else {
            let error = SyncError::MissingReferences {
                kind: K::KIND,
                key,
                missing: missing.into_iter().collect::<Vec<_>>().join(", "),
            };
            self.fail(&error, Some(&draft), None, &[]);
            return;
        };

        if let Err(source) = store.save(&draft, &missing).await {
            let error = SyncError::Deferred {
                kind: K::KIND,
                key,
                source,
            };
            self.fail(&error, Some(&draft), None, &[]);
            return;
        }

        let newly_parked = {
            let mut state = self.state.lock();
            let already = state.waiting.values().any(|drafts| drafts.contains(&key));
            for reference in &missing {
                state.waiting.entry(reference.clone()).or_default().insert(key.clone());
            }
            !already
        };
        if newly_parked {
            self.statistics.increment_deferred();
        }
        debug!(kind = K::KIND, key = %key, missing = ?missing, "parked until references exist");
    }

    /// Drops a draft that became ready from the deferred store, if it was
    /// parked there during this run.
    async fn release(&self, key: &str) {
        if !self.forget(key) {
            return;
        }
        self.statistics.decrement_deferred();
        let Some(store) = &self.deferred else {
            return;
        };
        if let Err(error) = store.delete(key).await {
            warn!(kind = K::KIND, key, "failed to remove parked draft: {error}");
        }
    }

    /// Parked drafts that can proceed now that `created` exist.
    async fn take_resolvable(&self, created: &[String]) -> Vec<K::Draft> {
        let Some(store) = &self.deferred else {
            return Vec::new();
        };
        let candidates: BTreeSet<String> = {
            let state = self.state.lock();
            created
                .iter()
                .filter_map(|key| state.waiting.get(key))
                .flatten()
                .cloned()
                .collect()
        };
        if candidates.is_empty() {
            return Vec::new();
        }

        let records = match store.fetch(&candidates).await {
            Ok(records) => records,
            Err(error) => {
                warn!(kind = K::KIND, "failed to fetch parked drafts: {error}");
                return Vec::new();
            }
        };

        let mut resolvable = Vec::new();
        for record in records {
            let resolved = record
                .missing_keys
                .iter()
                .all(|reference| self.cache.id_for_key(reference).is_some());
            let Some(key) = record.draft.natural_key().map(str::to_string) else {
                continue;
            };
            if resolved {
                self.release(&key).await;
                resolvable.push(record.draft);
            }
        }
        resolvable
    }

    /// Removes `key` from the waiting index. True if it was there.
    fn forget(&self, key: &str) -> bool {
        let mut state = self.state.lock();
        let mut found = false;
        state.waiting.retain(|_, drafts| {
            found |= drafts.remove(key);
            !drafts.is_empty()
        });
        found
    }

    fn count_processed(&self, key: &str) {
        let first_time = self.state.lock().seen.insert(key.to_string());
        if first_time {
            self.statistics.increment_processed(1);
        }
    }

    fn fail(&self, error: &SyncError, draft: Option<&K::Draft>, resource: Option<&K::Resource>, actions: &[K::Action]) {
        self.statistics.increment_failed(1);
        self.options.apply_error(error, draft, resource, actions);
    }
}

/// Forwards diff warnings and per-item errors to the caller's callbacks.
struct CallbackObserver<'a, K: SyncableResource> {
    options: &'a SyncOptions<K>,
    key: &'a str,
    draft: &'a K::Draft,
    resource: &'a K::Resource,
}

impl<K: SyncableResource> DiffObserver for CallbackObserver<'_, K> {
    fn warning(&self, message: &str) {
        self.options.apply_warning(message, Some(self.draft), Some(self.resource));
    }

    fn error(&self, error: &DiffError) {
        let error = SyncError::BuildActions {
            kind: K::KIND,
            key: self.key.to_string(),
            source: error.clone(),
        };
        self.options.apply_error(&error, Some(self.draft), Some(self.resource), &[]);
    }
}
