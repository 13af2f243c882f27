//! The category resource kind.

use crate::resource::SyncableResource;
use catsync_cache::ReferenceCache;
use catsync_deferred::{DeferredDraft, CATEGORY_CONTAINER};
use catsync_diff::{
    build_assets_update_actions, build_custom_update_actions, build_update_action, AssetAction,
    CustomActionBuilder, DiffObserver, DiffResult,
};
use catsync_types::{Asset, AssetDraft, CustomFieldSet, FieldValues, LocalizedString, ResourceIdentifier};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// A category as stored on the platform. The parent is referenced by id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub name: LocalizedString,
    pub slug: LocalizedString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<LocalizedString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ResourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomFieldSet>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// Desired state of a category. The parent is referenced by key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub name: LocalizedString,
    pub slug: LocalizedString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<LocalizedString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ResourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomFieldSet>,
    /// `None` removes every existing keyed asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<Vec<AssetDraft>>,
}

impl CategoryDraft {
    pub fn new(key: impl Into<String>, name: LocalizedString, slug: LocalizedString) -> Self {
        Self {
            key: Some(key.into()),
            name,
            slug,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_parent_key(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(ResourceIdentifier::of_key(parent));
        self
    }
}

impl DeferredDraft for CategoryDraft {
    fn natural_key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CategoryUpdateAction {
    ChangeName {
        name: LocalizedString,
    },
    ChangeSlug {
        slug: LocalizedString,
    },
    SetDescription {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<LocalizedString>,
    },
    ChangeOrderHint {
        order_hint: String,
    },
    ChangeParent {
        parent: ResourceIdentifier,
    },
    SetCustomType {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        type_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fields: Option<FieldValues>,
    },
    SetCustomField {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
    #[serde(untagged)]
    Asset(AssetAction),
}

/// Marker type implementing [`SyncableResource`] for categories.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryKind;

impl SyncableResource for CategoryKind {
    type Resource = Category;
    type Draft = CategoryDraft;
    type Action = CategoryUpdateAction;

    const KIND: &'static str = "category";
    const DEFERRED_CONTAINER: &'static str = CATEGORY_CONTAINER;

    fn resource_key(resource: &Category) -> Option<&str> {
        resource.key.as_deref()
    }

    fn resource_id(resource: &Category) -> &str {
        &resource.id
    }

    fn referenced_keys(draft: &CategoryDraft) -> BTreeSet<String> {
        draft
            .parent
            .as_ref()
            .and_then(ResourceIdentifier::key)
            .map(str::to_string)
            .into_iter()
            .collect()
    }

    fn referenced_ids(resource: &Category) -> BTreeSet<String> {
        resource
            .parent
            .as_ref()
            .and_then(ResourceIdentifier::id)
            .map(str::to_string)
            .into_iter()
            .collect()
    }

    fn build_actions(
        old: &Category,
        new: &CategoryDraft,
        cache: &ReferenceCache,
        observer: &dyn DiffObserver,
    ) -> DiffResult<Vec<CategoryUpdateAction>> {
        let target = format!("category with key '{}'", new.key.as_deref().unwrap_or_default());

        let mut actions: Vec<CategoryUpdateAction> = [
            build_update_action(&old.name, &new.name, || CategoryUpdateAction::ChangeName {
                name: new.name.clone(),
            }),
            build_update_action(&old.slug, &new.slug, || CategoryUpdateAction::ChangeSlug {
                slug: new.slug.clone(),
            }),
            build_update_action(&old.description, &new.description, || {
                CategoryUpdateAction::SetDescription {
                    description: new.description.clone(),
                }
            }),
            order_hint_action(old, new, observer),
            parent_action(old, new, cache, observer),
        ]
        .into_iter()
        .flatten()
        .collect();

        let custom = CategoryCustomBuilder { target: &target };
        actions.extend(build_custom_update_actions(
            old.custom.as_ref(),
            new.custom.as_ref(),
            &custom,
        )?);

        actions.extend(
            build_assets_update_actions(&target, &old.assets, new.assets.as_deref(), observer)?
                .into_iter()
                .map(CategoryUpdateAction::Asset),
        );
        Ok(actions)
    }
}

fn order_hint_action(
    old: &Category,
    new: &CategoryDraft,
    observer: &dyn DiffObserver,
) -> Option<CategoryUpdateAction> {
    match (&old.order_hint, &new.order_hint) {
        (Some(_), None) => {
            observer.warning("Cannot unset 'orderHint' field of a category. The field was left unchanged.");
            None
        }
        (_, Some(hint)) => build_update_action(&old.order_hint, &new.order_hint, || {
            CategoryUpdateAction::ChangeOrderHint {
                order_hint: hint.clone(),
            }
        }),
        (None, None) => None,
    }
}

/// Compares parents by key: the old parent's id is translated through the
/// cache. An unknown old id counts as a different parent.
fn parent_action(
    old: &Category,
    new: &CategoryDraft,
    cache: &ReferenceCache,
    observer: &dyn DiffObserver,
) -> Option<CategoryUpdateAction> {
    let Some(new_parent) = &new.parent else {
        if old.parent.is_some() {
            observer.warning("Cannot unset 'parent' field of a category. The field was left unchanged.");
        }
        return None;
    };
    let old_key = old
        .parent
        .as_ref()
        .and_then(|parent| match (parent.key(), parent.id()) {
            (Some(key), _) => Some(key.to_string()),
            (None, Some(id)) => cache.get(id),
            (None, None) => None,
        });
    let unchanged = match (new_parent.key(), new_parent.id()) {
        (Some(key), _) => old_key.as_deref() == Some(key),
        (None, Some(id)) => old.parent.as_ref().and_then(ResourceIdentifier::id) == Some(id),
        (None, None) => true,
    };
    (!unchanged).then(|| CategoryUpdateAction::ChangeParent {
        parent: new_parent.clone(),
    })
}

struct CategoryCustomBuilder<'a> {
    target: &'a str,
}

impl CustomActionBuilder for CategoryCustomBuilder<'_> {
    type Action = CategoryUpdateAction;

    fn target(&self) -> String {
        self.target.to_string()
    }

    fn set_custom_type(&self, type_id: &str, fields: &FieldValues) -> CategoryUpdateAction {
        CategoryUpdateAction::SetCustomType {
            type_id: Some(type_id.to_string()),
            fields: Some(fields.clone()),
        }
    }

    fn remove_custom_type(&self) -> CategoryUpdateAction {
        CategoryUpdateAction::SetCustomType {
            type_id: None,
            fields: None,
        }
    }

    fn set_custom_field(&self, name: &str, value: Option<&Value>) -> CategoryUpdateAction {
        CategoryUpdateAction::SetCustomField {
            name: name.to_string(),
            value: value.cloned(),
        }
    }
}
