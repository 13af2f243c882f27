//! Ordered collection reconciliation.
//!
//! Turns an existing ordered list of keyed items into the list described by
//! a set of drafts using four kinds of actions: remove, modify, reorder and
//! add. The result is always ordered as:
//!
//! 1. removals,
//! 2. per-item modifications (in old-list order),
//! 3. at most one reorder of the surviving items,
//! 4. additions (in draft order, each carrying its target index).
//!
//! A reorder can only name items that already exist, and additions carry
//! their final position, so adding last never invalidates the reorder.

use crate::error::{DiffError, DiffResult};
use crate::observer::DiffObserver;
use catsync_types::is_blank;
use std::collections::HashMap;
use tracing::debug;

/// Describes one kind of keyed collection and builds its actions.
pub trait CollectionActions {
    /// Item as it currently exists.
    type Old;
    /// Desired item.
    type New;
    type Action;

    /// Human-readable container name used in messages (e.g. `assets`).
    fn container(&self) -> String;

    fn old_key<'a>(&self, item: &'a Self::Old) -> Option<&'a str>;

    fn new_key<'a>(&self, draft: &'a Self::New) -> Option<&'a str>;

    /// Identifier the reorder action refers to (an id for assets, the key
    /// for enum values).
    fn order_id(&self, item: &Self::Old) -> String;

    fn remove(&self, key: &str) -> Self::Action;

    /// Removal of several items at once; collections whose platform action
    /// accepts a list override this.
    fn remove_many(&self, keys: Vec<String>) -> Vec<Self::Action> {
        keys.iter().map(|key| self.remove(key)).collect()
    }

    /// Attribute changes of one matched item.
    fn modify(&self, old: &Self::Old, new: &Self::New) -> DiffResult<Vec<Self::Action>>;

    fn reorder(&self, order: Vec<String>) -> Self::Action;

    fn add(&self, draft: &Self::New, position: usize) -> Self::Action;
}

/// Reconciles `old` against `new`.
///
/// `None` for `new` means the collection is not managed by the draft any
/// more, so every keyed old item is removed.
///
/// Old items without a key are reported as warnings and left in place.
/// A draft without a key or two drafts sharing a key abort the whole
/// reconciliation. A failed [`CollectionActions::modify`] is reported to
/// `observer` and only drops that item's actions.
pub fn reconcile<C: CollectionActions>(
    collection: &C,
    old: &[C::Old],
    new: Option<&[C::New]>,
    observer: &dyn DiffObserver,
) -> DiffResult<Vec<C::Action>> {
    let container = collection.container();

    let keyed_old: Vec<(&str, &C::Old)> = old
        .iter()
        .enumerate()
        .filter_map(|(position, item)| match collection.old_key(item) {
            Some(key) if !is_blank(key) => Some((key, item)),
            _ => {
                observer.warning(&format!(
                    "{container} item at position {position} has no key and was left untouched"
                ));
                None
            }
        })
        .collect();

    let Some(new) = new else {
        let keys = keyed_old.iter().map(|(key, _)| key.to_string()).collect();
        return Ok(collection.remove_many(keys));
    };

    let drafts = index_drafts(collection, &container, new)?;

    let mut actions = Vec::new();

    let removed: Vec<String> = keyed_old
        .iter()
        .filter(|(key, _)| !drafts.contains_key(key))
        .map(|(key, _)| key.to_string())
        .collect();
    if !removed.is_empty() {
        actions.extend(collection.remove_many(removed));
    }

    let mut surviving: HashMap<&str, &C::Old> = HashMap::new();
    for (key, item) in &keyed_old {
        let Some(&draft) = drafts.get(key) else {
            continue;
        };
        surviving.insert(*key, *item);
        match collection.modify(item, draft) {
            Ok(changes) => actions.extend(changes),
            Err(error) => {
                debug!(container = %container, key = %key, "dropping item actions: {error}");
                observer.error(&error);
            }
        }
    }

    let current_order: Vec<String> = keyed_old
        .iter()
        .filter(|(key, _)| surviving.contains_key(key))
        .map(|(_, item)| collection.order_id(item))
        .collect();
    let desired_order: Vec<String> = new
        .iter()
        .filter_map(|draft| collection.new_key(draft))
        .filter_map(|key| surviving.get(key))
        .map(|item| collection.order_id(item))
        .collect();
    if current_order != desired_order {
        actions.push(collection.reorder(desired_order));
    }

    for (position, draft) in new.iter().enumerate() {
        let is_new = collection
            .new_key(draft)
            .is_some_and(|key| !surviving.contains_key(key));
        if is_new {
            actions.push(collection.add(draft, position));
        }
    }

    Ok(actions)
}

fn index_drafts<'a, C: CollectionActions>(
    collection: &C,
    container: &str,
    new: &'a [C::New],
) -> DiffResult<HashMap<&'a str, &'a C::New>> {
    let mut drafts = HashMap::with_capacity(new.len());
    for (position, draft) in new.iter().enumerate() {
        let key = collection
            .new_key(draft)
            .filter(|key| !is_blank(key))
            .ok_or_else(|| DiffError::MissingDraftKey {
                container: container.to_string(),
                position,
            })?;
        if drafts.insert(key, draft).is_some() {
            return Err(DiffError::DuplicateKey {
                container: container.to_string(),
                key: key.to_string(),
            });
        }
    }
    Ok(drafts)
}
