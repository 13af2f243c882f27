use crate::error::SyncError;
use crate::resource::SyncableResource;
use catsync_batch::BatchConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Configuration for a sync run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Drafts processed together.
    pub batch_size: usize,
    /// Entries kept by the reference cache.
    pub cache_capacity: usize,
    /// Overrides the resource kind's container for parked drafts.
    pub deferred_container: Option<String>,
    pub batch: BatchConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: 30,
            cache_capacity: catsync_cache::DEFAULT_CAPACITY,
            deferred_container: None,
            batch: BatchConfig::default(),
        }
    }
}

type ErrorCallback<K> = Arc<
    dyn Fn(
            &SyncError,
            Option<&<K as SyncableResource>::Draft>,
            Option<&<K as SyncableResource>::Resource>,
            &[<K as SyncableResource>::Action],
        ) + Send
        + Sync,
>;

type WarningCallback<K> = Arc<
    dyn Fn(&str, Option<&<K as SyncableResource>::Draft>, Option<&<K as SyncableResource>::Resource>)
        + Send
        + Sync,
>;

type BeforeUpdateCallback<K> = Arc<
    dyn Fn(
            Vec<<K as SyncableResource>::Action>,
            &<K as SyncableResource>::Draft,
            &<K as SyncableResource>::Resource,
        ) -> Vec<<K as SyncableResource>::Action>
        + Send
        + Sync,
>;

type BeforeCreateCallback<K> =
    Arc<dyn Fn(<K as SyncableResource>::Draft) -> Option<<K as SyncableResource>::Draft> + Send + Sync>;

/// Configuration plus caller hooks.
///
/// Error and warning callbacks are fire-and-forget. The before-update hook
/// sees every non-empty action list and may filter or extend it; an empty
/// result skips the update. The before-create hook may transform a draft or
/// drop it by returning `None`.
pub struct SyncOptions<K: SyncableResource> {
    pub config: SyncConfig,
    error_callback: Option<ErrorCallback<K>>,
    warning_callback: Option<WarningCallback<K>>,
    before_update: Option<BeforeUpdateCallback<K>>,
    before_create: Option<BeforeCreateCallback<K>>,
}

impl<K: SyncableResource> SyncOptions<K> {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            error_callback: None,
            warning_callback: None,
            before_update: None,
            before_create: None,
        }
    }

    #[must_use]
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&SyncError, Option<&K::Draft>, Option<&K::Resource>, &[K::Action]) + Send + Sync + 'static,
    {
        self.error_callback = Some(Arc::new(callback));
        self
    }

    #[must_use]
    pub fn on_warning<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, Option<&K::Draft>, Option<&K::Resource>) + Send + Sync + 'static,
    {
        self.warning_callback = Some(Arc::new(callback));
        self
    }

    #[must_use]
    pub fn before_update<F>(mut self, callback: F) -> Self
    where
        F: Fn(Vec<K::Action>, &K::Draft, &K::Resource) -> Vec<K::Action> + Send + Sync + 'static,
    {
        self.before_update = Some(Arc::new(callback));
        self
    }

    #[must_use]
    pub fn before_create<F>(mut self, callback: F) -> Self
    where
        F: Fn(K::Draft) -> Option<K::Draft> + Send + Sync + 'static,
    {
        self.before_create = Some(Arc::new(callback));
        self
    }

    pub(crate) fn apply_error(
        &self,
        error: &SyncError,
        draft: Option<&K::Draft>,
        resource: Option<&K::Resource>,
        actions: &[K::Action],
    ) {
        tracing::error!(kind = K::KIND, "{error}");
        if let Some(callback) = &self.error_callback {
            callback(error, draft, resource, actions);
        }
    }

    pub(crate) fn apply_warning(&self, message: &str, draft: Option<&K::Draft>, resource: Option<&K::Resource>) {
        tracing::warn!(kind = K::KIND, "{message}");
        if let Some(callback) = &self.warning_callback {
            callback(message, draft, resource);
        }
    }

    pub(crate) fn apply_before_update(
        &self,
        actions: Vec<K::Action>,
        draft: &K::Draft,
        resource: &K::Resource,
    ) -> Vec<K::Action> {
        match &self.before_update {
            Some(callback) if !actions.is_empty() => callback(actions, draft, resource),
            _ => actions,
        }
    }

    pub(crate) fn apply_before_create(&self, draft: K::Draft) -> Option<K::Draft> {
        match &self.before_create {
            Some(callback) => callback(draft),
            None => Some(draft),
        }
    }
}

impl<K: SyncableResource> Default for SyncOptions<K> {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}

impl<K: SyncableResource> Clone for SyncOptions<K> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            error_callback: self.error_callback.clone(),
            warning_callback: self.warning_callback.clone(),
            before_update: self.before_update.clone(),
            before_create: self.before_create.clone(),
        }
    }
}

impl<K: SyncableResource> fmt::Debug for SyncOptions<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncOptions")
            .field("config", &self.config)
            .field("error_callback", &self.error_callback.is_some())
            .field("warning_callback", &self.warning_callback.is_some())
            .field("before_update", &self.before_update.is_some())
            .field("before_create", &self.before_create.is_some())
            .finish()
    }
}
