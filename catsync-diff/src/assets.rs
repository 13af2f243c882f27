//! Asset list reconciliation.

use crate::collection::{reconcile, CollectionActions};
use crate::custom::{build_custom_update_actions, CustomActionBuilder};
use crate::error::DiffResult;
use crate::field::build_update_action;
use crate::observer::DiffObserver;
use catsync_types::{Asset, AssetDraft, AssetSource, FieldValues, LocalizedString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Update actions on the assets of one resource.
///
/// Assets are addressed by key, except for [`AssetAction::ChangeAssetOrder`]
/// which lists platform ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum AssetAction {
    RemoveAsset {
        asset_key: String,
    },
    ChangeAssetOrder {
        asset_order: Vec<String>,
    },
    AddAsset {
        asset: AssetDraft,
        position: usize,
    },
    ChangeAssetName {
        asset_key: String,
        name: LocalizedString,
    },
    SetAssetDescription {
        asset_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<LocalizedString>,
    },
    SetAssetTags {
        asset_key: String,
        tags: Vec<String>,
    },
    SetAssetSources {
        asset_key: String,
        sources: Vec<AssetSource>,
    },
    SetAssetCustomType {
        asset_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        type_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fields: Option<FieldValues>,
    },
    SetAssetCustomField {
        asset_key: String,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
}

/// Reconciles the assets of the resource described by `owner`
/// (e.g. `category with key 'shoes'`).
pub fn build_assets_update_actions(
    owner: &str,
    old: &[Asset],
    new: Option<&[AssetDraft]>,
    observer: &dyn DiffObserver,
) -> DiffResult<Vec<AssetAction>> {
    reconcile(&AssetCollection { owner }, old, new, observer)
}

struct AssetCollection<'a> {
    owner: &'a str,
}

impl CollectionActions for AssetCollection<'_> {
    type Old = Asset;
    type New = AssetDraft;
    type Action = AssetAction;

    fn container(&self) -> String {
        format!("assets of the {}", self.owner)
    }

    fn old_key<'a>(&self, item: &'a Asset) -> Option<&'a str> {
        item.key.as_deref()
    }

    fn new_key<'a>(&self, draft: &'a AssetDraft) -> Option<&'a str> {
        draft.key.as_deref()
    }

    fn order_id(&self, item: &Asset) -> String {
        item.id.clone()
    }

    fn remove(&self, key: &str) -> AssetAction {
        AssetAction::RemoveAsset {
            asset_key: key.to_string(),
        }
    }

    fn modify(&self, old: &Asset, new: &AssetDraft) -> DiffResult<Vec<AssetAction>> {
        let key = old.key.clone().unwrap_or_default();
        let mut actions: Vec<AssetAction> = [
            build_update_action(&old.name, &new.name, || AssetAction::ChangeAssetName {
                asset_key: key.clone(),
                name: new.name.clone(),
            }),
            build_update_action(&old.description, &new.description, || {
                AssetAction::SetAssetDescription {
                    asset_key: key.clone(),
                    description: new.description.clone(),
                }
            }),
            build_update_action(&old.tags, &new.tags, || AssetAction::SetAssetTags {
                asset_key: key.clone(),
                tags: new.tags.clone(),
            }),
            build_update_action(&old.sources, &new.sources, || AssetAction::SetAssetSources {
                asset_key: key.clone(),
                sources: new.sources.clone(),
            }),
        ]
        .into_iter()
        .flatten()
        .collect();

        let custom = AssetCustomBuilder {
            owner: self.owner,
            asset_key: &key,
        };
        actions.extend(build_custom_update_actions(
            old.custom.as_ref(),
            new.custom.as_ref(),
            &custom,
        )?);
        Ok(actions)
    }

    fn reorder(&self, order: Vec<String>) -> AssetAction {
        AssetAction::ChangeAssetOrder { asset_order: order }
    }

    fn add(&self, draft: &AssetDraft, position: usize) -> AssetAction {
        AssetAction::AddAsset {
            asset: draft.clone(),
            position,
        }
    }
}

struct AssetCustomBuilder<'a> {
    owner: &'a str,
    asset_key: &'a str,
}

impl CustomActionBuilder for AssetCustomBuilder<'_> {
    type Action = AssetAction;

    fn target(&self) -> String {
        format!("asset with key '{}' of the {}", self.asset_key, self.owner)
    }

    fn set_custom_type(&self, type_id: &str, fields: &FieldValues) -> AssetAction {
        AssetAction::SetAssetCustomType {
            asset_key: self.asset_key.to_string(),
            type_id: Some(type_id.to_string()),
            fields: Some(fields.clone()),
        }
    }

    fn remove_custom_type(&self) -> AssetAction {
        AssetAction::SetAssetCustomType {
            asset_key: self.asset_key.to_string(),
            type_id: None,
            fields: None,
        }
    }

    fn set_custom_field(&self, name: &str, value: Option<&Value>) -> AssetAction {
        AssetAction::SetAssetCustomField {
            asset_key: self.asset_key.to_string(),
            name: name.to_string(),
            value: value.cloned(),
        }
    }
}
