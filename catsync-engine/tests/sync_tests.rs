use async_trait::async_trait;
use catsync_batch::{BatchConfig, RequestError, RetryConfig};
use catsync_deferred::{KeyValueClient, MemoryKeyValueClient, CATEGORY_CONTAINER};
use catsync_engine::{
    Category, CategoryDraft, CategoryKind, CategoryUpdateAction, ResourceClient, ResourceSync, SyncConfig,
    SyncOptions,
};
use catsync_types::{LocalizedString, ResourceIdentifier};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn en(text: &str) -> LocalizedString {
    LocalizedString::of("en", text)
}

fn draft(key: &str) -> CategoryDraft {
    CategoryDraft::new(key, en(key), en(key))
}

/// In-memory platform holding categories.
#[derive(Default)]
struct MockPlatform {
    categories: Mutex<Vec<Category>>,
    next_id: AtomicUsize,
    update_error: Mutex<Option<RequestError>>,
    update_calls: Mutex<Vec<(String, Vec<CategoryUpdateAction>)>>,
}

impl MockPlatform {
    fn with(categories: Vec<Category>) -> Self {
        Self {
            categories: Mutex::new(categories),
            ..Default::default()
        }
    }

    fn get(&self, key: &str) -> Option<Category> {
        self.categories
            .lock()
            .iter()
            .find(|c| c.key.as_deref() == Some(key))
            .cloned()
    }

    fn id_of(&self, key: &str) -> Option<String> {
        self.get(key).map(|c| c.id)
    }

    fn fail_updates_with(&self, error: RequestError) {
        *self.update_error.lock() = Some(error);
    }

    fn update_calls(&self) -> Vec<(String, Vec<CategoryUpdateAction>)> {
        self.update_calls.lock().clone()
    }
}

fn existing(key: &str) -> Category {
    Category {
        id: format!("id-{key}"),
        version: 1,
        key: Some(key.to_string()),
        name: en(key),
        slug: en(key),
        ..Default::default()
    }
}

#[async_trait]
impl ResourceClient<CategoryKind> for MockPlatform {
    async fn fetch_by_keys(&self, keys: &[String]) -> Result<Vec<Category>, RequestError> {
        Ok(self
            .categories
            .lock()
            .iter()
            .filter(|c| c.key.as_ref().is_some_and(|key| keys.contains(key)))
            .cloned()
            .collect())
    }

    async fn resolve_keys(&self, keys: &[String]) -> Result<Vec<(String, String)>, RequestError> {
        Ok(self
            .categories
            .lock()
            .iter()
            .filter_map(|c| {
                let key = c.key.clone()?;
                keys.contains(&key).then(|| (c.id.clone(), key))
            })
            .collect())
    }

    async fn resolve_ids(&self, ids: &[String]) -> Result<Vec<(String, String)>, RequestError> {
        Ok(self
            .categories
            .lock()
            .iter()
            .filter(|c| ids.contains(&c.id))
            .filter_map(|c| Some((c.id.clone(), c.key.clone()?)))
            .collect())
    }

    async fn create(&self, draft: &CategoryDraft) -> Result<Category, RequestError> {
        let parent = match draft.parent.as_ref().and_then(ResourceIdentifier::key) {
            Some(key) => Some(ResourceIdentifier::of_id(
                self.id_of(key)
                    .ok_or_else(|| RequestError::Invalid(format!("parent '{key}' does not exist")))?,
            )),
            None => None,
        };
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let category = Category {
            id: format!("new-{n}"),
            version: 1,
            key: draft.key.clone(),
            name: draft.name.clone(),
            slug: draft.slug.clone(),
            description: draft.description.clone(),
            order_hint: draft.order_hint.clone(),
            parent,
            custom: draft.custom.clone(),
            assets: Vec::new(),
        };
        self.categories.lock().push(category.clone());
        Ok(category)
    }

    async fn update(&self, resource: &Category, actions: &[CategoryUpdateAction]) -> Result<Category, RequestError> {
        self.update_calls
            .lock()
            .push((resource.key.clone().unwrap_or_default(), actions.to_vec()));
        if let Some(error) = self.update_error.lock().clone() {
            return Err(error);
        }
        let mut categories = self.categories.lock();
        let category = categories
            .iter_mut()
            .find(|c| c.id == resource.id)
            .ok_or_else(|| RequestError::NotFound(resource.id.clone()))?;
        category.version += 1;
        for action in actions {
            if let CategoryUpdateAction::ChangeName { name } = action {
                category.name = name.clone();
            }
        }
        Ok(category.clone())
    }

    async fn delete(&self, resource: &Category) -> Result<Category, RequestError> {
        let mut categories = self.categories.lock();
        let position = categories
            .iter()
            .position(|c| c.id == resource.id)
            .ok_or_else(|| RequestError::NotFound(resource.id.clone()))?;
        Ok(categories.remove(position))
    }
}

fn category_sync(platform: Arc<MockPlatform>, options: SyncOptions<CategoryKind>) -> ResourceSync<CategoryKind> {
    ResourceSync::new(platform, options)
}

fn options() -> SyncOptions<CategoryKind> {
    SyncOptions::new(SyncConfig {
        batch: BatchConfig {
            retry: RetryConfig {
                max_retries: 0,
                ..RetryConfig::default()
            },
            ..BatchConfig::default()
        },
        ..SyncConfig::default()
    })
}

/// Collects error messages passed to the error callback.
fn recording_errors(options: SyncOptions<CategoryKind>) -> (SyncOptions<CategoryKind>, Arc<Mutex<Vec<String>>>) {
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);
    let options = options.on_error(move |error, _, _, _| sink.lock().push(error.to_string()));
    (options, errors)
}

// ── Create and update ────────────────────────────────────────────

#[tokio::test]
async fn creates_missing_categories() {
    let platform = Arc::new(MockPlatform::default());
    let sync = category_sync(platform.clone(), options());

    let stats = sync.sync(vec![draft("shoes"), draft("hats")]).await;

    assert_eq!(stats.processed(), 2);
    assert_eq!(stats.created(), 2);
    assert_eq!(stats.failed(), 0);
    assert!(platform.get("shoes").is_some());
    assert_eq!(
        stats.report_message(),
        "Summary: 2 resources were processed in total (2 created, 0 updated and 0 failed to sync)."
    );
}

#[tokio::test]
async fn updates_only_changed_categories() {
    let platform = Arc::new(MockPlatform::with(vec![existing("shoes"), existing("hats")]));
    let sync = category_sync(platform.clone(), options());
    let mut renamed = draft("shoes");
    renamed.name = en("Shoes");

    let stats = sync.sync(vec![renamed, draft("hats")]).await;

    assert_eq!(stats.processed(), 2);
    assert_eq!(stats.updated(), 1);
    assert_eq!(stats.created(), 0);
    assert_eq!(
        platform.update_calls(),
        vec![(
            "shoes".to_string(),
            vec![CategoryUpdateAction::ChangeName { name: en("Shoes") }]
        )]
    );
    assert_eq!(platform.get("shoes").map(|c| c.name), Some(en("Shoes")));
}

#[tokio::test]
async fn existing_parent_id_is_matched_by_key() {
    let mut child = existing("shoes");
    child.parent = Some(ResourceIdentifier::of_id("id-clothing"));
    let platform = Arc::new(MockPlatform::with(vec![existing("clothing"), child]));
    let sync = category_sync(platform.clone(), options());

    let stats = sync.sync(vec![draft("shoes").with_parent_key("clothing")]).await;

    assert_eq!(stats.updated(), 0);
    assert_eq!(stats.failed(), 0);
    assert!(platform.update_calls().is_empty());
    assert_eq!(sync.cache().get("id-clothing").as_deref(), Some("clothing"));
}

// ── Failures ─────────────────────────────────────────────────────

#[tokio::test]
async fn blank_key_is_reported_and_skipped() {
    let platform = Arc::new(MockPlatform::default());
    let (options, errors) = recording_errors(options());
    let sync = category_sync(platform.clone(), options);
    let mut keyless = draft("x");
    keyless.key = Some("  ".to_string());

    let stats = sync.sync(vec![keyless, draft("shoes")]).await;

    assert_eq!(stats.processed(), 2);
    assert_eq!(stats.failed(), 1);
    assert_eq!(stats.created(), 1);
    assert_eq!(
        errors.lock().clone(),
        vec!["category draft at position 0 has no key. Please make sure all drafts have keys.".to_string()]
    );
}

#[tokio::test]
async fn duplicate_key_in_batch_is_reported() {
    let platform = Arc::new(MockPlatform::default());
    let (options, errors) = recording_errors(options());
    let sync = category_sync(platform.clone(), options);
    let mut second = draft("shoes");
    second.name = en("Other shoes");

    let stats = sync.sync(vec![draft("shoes"), second, draft("hats")]).await;

    assert_eq!(stats.processed(), 3);
    assert_eq!(stats.created(), 2);
    assert_eq!(stats.failed(), 1);
    assert_eq!(platform.get("shoes").map(|c| c.name), Some(en("shoes")));
    assert_eq!(
        errors.lock().clone(),
        vec!["category draft with key 'shoes' appears more than once in the batch. Only the first one is synced."
            .to_string()]
    );
}

#[tokio::test]
async fn conflicting_update_is_reported_once() {
    let platform = Arc::new(MockPlatform::with(vec![existing("shoes")]));
    platform.fail_updates_with(RequestError::Conflict {
        current_version: Some(2),
        message: "version mismatch".to_string(),
    });
    let conflicts = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&conflicts);
    let options = options().on_error(move |error, draft, resource, actions| {
        assert!(draft.is_some() && resource.is_some());
        assert_eq!(actions.len(), 1);
        if error.is_conflict() {
            seen.fetch_add(1, Ordering::SeqCst);
        }
    });
    let sync = category_sync(platform.clone(), options);
    let mut renamed = draft("shoes");
    renamed.name = en("Shoes");

    let stats = sync.sync(vec![renamed]).await;

    assert_eq!(stats.failed(), 1);
    assert_eq!(stats.updated(), 0);
    assert_eq!(conflicts.load(Ordering::SeqCst), 1);
    assert_eq!(platform.update_calls().len(), 1);
}

#[tokio::test]
async fn missing_reference_without_store_fails() {
    let platform = Arc::new(MockPlatform::default());
    let (options, errors) = recording_errors(options());
    let sync = category_sync(platform.clone(), options);

    let stats = sync.sync(vec![draft("shoes").with_parent_key("clothing")]).await;

    assert_eq!(stats.failed(), 1);
    assert_eq!(stats.deferred(), 0);
    assert!(errors.lock()[0].contains("clothing"));
}

// ── Deferral ─────────────────────────────────────────────────────

#[tokio::test]
async fn child_before_parent_in_one_batch() {
    let platform = Arc::new(MockPlatform::default());
    let store = Arc::new(MemoryKeyValueClient::new());
    let sync = category_sync(platform.clone(), options()).with_deferred_store(store.clone());

    let stats = sync
        .sync(vec![draft("shoes").with_parent_key("clothing"), draft("clothing")])
        .await;

    assert_eq!(stats.processed(), 2);
    assert_eq!(stats.created(), 2);
    assert_eq!(stats.failed(), 0);
    assert_eq!(stats.deferred(), 0);
    let parent_id = platform.id_of("clothing");
    assert_eq!(
        platform.get("shoes").and_then(|c| c.parent).and_then(|p| p.id().map(str::to_string)),
        parent_id
    );
    assert!(store.is_empty());
}

#[tokio::test]
async fn child_before_parent_across_batches() {
    let platform = Arc::new(MockPlatform::default());
    let store = Arc::new(MemoryKeyValueClient::new());
    let mut options = options();
    options.config.batch_size = 1;
    let sync = category_sync(platform.clone(), options).with_deferred_store(store.clone());

    let stats = sync
        .sync(vec![
            draft("sneakers").with_parent_key("shoes"),
            draft("shoes").with_parent_key("clothing"),
            draft("clothing"),
        ])
        .await;

    assert_eq!(stats.processed(), 3);
    assert_eq!(stats.created(), 3);
    assert_eq!(stats.deferred(), 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn unresolved_draft_stays_parked() {
    let platform = Arc::new(MockPlatform::default());
    let store = Arc::new(MemoryKeyValueClient::new());
    let sync = category_sync(platform.clone(), options()).with_deferred_store(store.clone());

    let stats = sync.sync(vec![draft("shoes").with_parent_key("clothing")]).await;

    assert_eq!(stats.processed(), 1);
    assert_eq!(stats.deferred(), 1);
    assert_eq!(stats.failed(), 0);
    assert_eq!(stats.created(), 0);
    assert_eq!(store.len(CATEGORY_CONTAINER), 1);
    assert!(platform.get("shoes").is_none());
}

#[tokio::test]
async fn custom_container_is_used_for_parked_drafts() {
    let platform = Arc::new(MockPlatform::default());
    let store = Arc::new(MemoryKeyValueClient::new());
    let mut options = options();
    options.config.deferred_container = Some("staging.categories".to_string());
    let sync = category_sync(platform, options).with_deferred_store(store.clone());

    sync.sync(vec![draft("shoes").with_parent_key("clothing")]).await;

    assert_eq!(store.len("staging.categories"), 1);
    let entry = store.get("staging.categories", &catsync_deferred::hash_key("shoes")).await.unwrap();
    assert!(entry.is_some());
}

// ── Hooks ────────────────────────────────────────────────────────

#[tokio::test]
async fn before_create_can_drop_drafts() {
    let platform = Arc::new(MockPlatform::default());
    let options = options().before_create(|draft| (draft.key.as_deref() != Some("hats")).then_some(draft));
    let sync = category_sync(platform.clone(), options);

    let stats = sync.sync(vec![draft("shoes"), draft("hats")]).await;

    assert_eq!(stats.processed(), 2);
    assert_eq!(stats.created(), 1);
    assert!(platform.get("hats").is_none());
}

#[tokio::test]
async fn before_update_can_filter_actions() {
    let platform = Arc::new(MockPlatform::with(vec![existing("shoes")]));
    let options = options().before_update(|actions, _, _| {
        actions
            .into_iter()
            .filter(|action| !matches!(action, CategoryUpdateAction::ChangeName { .. }))
            .collect()
    });
    let sync = category_sync(platform.clone(), options);
    let mut renamed = draft("shoes");
    renamed.name = en("Shoes");

    let stats = sync.sync(vec![renamed]).await;

    assert_eq!(stats.updated(), 0);
    assert!(platform.update_calls().is_empty());
}

#[tokio::test]
async fn warnings_reach_the_callback() {
    let mut old = existing("shoes");
    old.order_hint = Some("0.1".to_string());
    let platform = Arc::new(MockPlatform::with(vec![old]));
    let warnings = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&warnings);
    let options = options().on_warning(move |message, draft, resource| {
        assert!(draft.is_some() && resource.is_some());
        sink.lock().push(message.to_string());
    });
    let sync = category_sync(platform, options);

    let stats = sync.sync(vec![draft("shoes")]).await;

    assert_eq!(stats.failed(), 0);
    assert_eq!(warnings.lock().len(), 1);
    assert!(warnings.lock()[0].contains("orderHint"));
}
