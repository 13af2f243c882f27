//! Capabilities the sync engine needs from a resource kind.

use async_trait::async_trait;
use catsync_batch::RequestError;
use catsync_cache::ReferenceCache;
use catsync_deferred::DeferredDraft;
use catsync_diff::{DiffObserver, DiffResult};
use std::collections::BTreeSet;
use std::fmt::Debug;

/// One kind of platform resource (categories, products, ...).
///
/// Implemented once per kind on a marker type; the sync engine is generic
/// over it.
pub trait SyncableResource: Send + Sync + 'static {
    /// The resource as it exists on the platform.
    type Resource: Clone + Debug + Send + Sync;
    /// Desired state of a resource.
    type Draft: DeferredDraft + Debug;
    type Action: Clone + Debug + Send + Sync;

    /// Name used in messages, e.g. `category`.
    const KIND: &'static str;

    /// Container parked drafts of this kind are stored in.
    const DEFERRED_CONTAINER: &'static str;

    fn resource_key(resource: &Self::Resource) -> Option<&str>;

    fn resource_id(resource: &Self::Resource) -> &str;

    /// Keys of other resources a draft points at.
    fn referenced_keys(draft: &Self::Draft) -> BTreeSet<String>;

    /// Ids of other resources an existing resource points at.
    fn referenced_ids(resource: &Self::Resource) -> BTreeSet<String>;

    /// Actions turning `old` into `new`. References of `old` are compared by
    /// key through `cache`.
    fn build_actions(
        old: &Self::Resource,
        new: &Self::Draft,
        cache: &ReferenceCache,
        observer: &dyn DiffObserver,
    ) -> DiffResult<Vec<Self::Action>>;
}

/// Platform access for one resource kind.
#[async_trait]
pub trait ResourceClient<K: SyncableResource>: Send + Sync {
    /// Existing resources with the given keys. Unknown keys are absent.
    async fn fetch_by_keys(&self, keys: &[String]) -> Result<Vec<K::Resource>, RequestError>;

    /// `(id, key)` pairs of the referenced resources with the given keys.
    async fn resolve_keys(&self, keys: &[String]) -> Result<Vec<(String, String)>, RequestError>;

    /// `(id, key)` pairs of the referenced resources with the given ids.
    async fn resolve_ids(&self, ids: &[String]) -> Result<Vec<(String, String)>, RequestError>;

    async fn create(&self, draft: &K::Draft) -> Result<K::Resource, RequestError>;

    /// Applies `actions` in order against `resource`'s current version.
    async fn update(&self, resource: &K::Resource, actions: &[K::Action]) -> Result<K::Resource, RequestError>;

    async fn delete(&self, resource: &K::Resource) -> Result<K::Resource, RequestError>;
}
