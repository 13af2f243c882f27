//! Enum value list reconciliation.
//!
//! Works for both plain and localized values of an enum-typed definition
//! (a product-type attribute or a custom-type field). Values are addressed
//! by key; the platform removes them in one action and orders them by key.

use crate::collection::{reconcile, CollectionActions};
use crate::error::DiffResult;
use crate::observer::DiffObserver;
use catsync_types::EnumValue;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Update actions on the values of one enum definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EnumValueAction<V> {
    RemoveEnumValues {
        definition: String,
        keys: Vec<String>,
    },
    ChangeEnumValueLabel {
        definition: String,
        value: V,
    },
    AddEnumValue {
        definition: String,
        value: V,
        position: usize,
    },
    ChangeEnumValueOrder {
        definition: String,
        keys: Vec<String>,
    },
}

/// Reconciles the values of the enum definition named `definition`.
///
/// `None` for `new` removes every old value in a single action.
pub fn build_enum_values_update_actions<V: EnumValue>(
    definition: &str,
    old: &[V],
    new: Option<&[V]>,
    observer: &dyn DiffObserver,
) -> DiffResult<Vec<EnumValueAction<V>>> {
    let collection = EnumCollection {
        definition,
        _value: PhantomData,
    };
    reconcile(&collection, old, new, observer)
}

struct EnumCollection<'a, V> {
    definition: &'a str,
    _value: PhantomData<V>,
}

impl<V: EnumValue> CollectionActions for EnumCollection<'_, V> {
    type Old = V;
    type New = V;
    type Action = EnumValueAction<V>;

    fn container(&self) -> String {
        format!("enum values of '{}'", self.definition)
    }

    fn old_key<'a>(&self, item: &'a V) -> Option<&'a str> {
        Some(item.key())
    }

    fn new_key<'a>(&self, draft: &'a V) -> Option<&'a str> {
        Some(draft.key())
    }

    fn order_id(&self, item: &V) -> String {
        item.key().to_string()
    }

    fn remove(&self, key: &str) -> EnumValueAction<V> {
        EnumValueAction::RemoveEnumValues {
            definition: self.definition.to_string(),
            keys: vec![key.to_string()],
        }
    }

    fn remove_many(&self, keys: Vec<String>) -> Vec<EnumValueAction<V>> {
        if keys.is_empty() {
            return Vec::new();
        }
        vec![EnumValueAction::RemoveEnumValues {
            definition: self.definition.to_string(),
            keys,
        }]
    }

    fn modify(&self, old: &V, new: &V) -> DiffResult<Vec<EnumValueAction<V>>> {
        if !old.label_differs(new) {
            return Ok(Vec::new());
        }
        Ok(vec![EnumValueAction::ChangeEnumValueLabel {
            definition: self.definition.to_string(),
            value: new.clone(),
        }])
    }

    fn reorder(&self, keys: Vec<String>) -> EnumValueAction<V> {
        EnumValueAction::ChangeEnumValueOrder {
            definition: self.definition.to_string(),
            keys,
        }
    }

    fn add(&self, draft: &V, position: usize) -> EnumValueAction<V> {
        EnumValueAction::AddEnumValue {
            definition: self.definition.to_string(),
            value: draft.clone(),
            position,
        }
    }
}
