//! Custom field diff.
//!
//! Compares the custom field set of an existing object with the one of its
//! draft. The same algorithm serves every object that can carry custom
//! fields (categories, assets, prices, ...); the [`CustomActionBuilder`]
//! supplied by the caller turns each decision into that object's concrete
//! action type.

use crate::error::{DiffError, DiffResult};
use crate::json::{json_opt_eq, non_null};
use catsync_types::{is_blank, CustomFieldSet, FieldValues};
use serde_json::Value;

/// Builds the concrete custom-field actions of one object kind.
pub trait CustomActionBuilder {
    type Action;

    /// Describes the object carrying the fields, for error messages
    /// (e.g. `category with key 'shoes'`).
    fn target(&self) -> String;

    /// Sets the type and replaces all fields.
    fn set_custom_type(&self, type_id: &str, fields: &FieldValues) -> Self::Action;

    /// Removes the type together with all fields.
    fn remove_custom_type(&self) -> Self::Action;

    /// Sets one field; `None` unsets it.
    fn set_custom_field(&self, name: &str, value: Option<&Value>) -> Self::Action;
}

/// Computes the actions turning `old` into `new`.
///
/// | old | new | result |
/// |---|---|---|
/// | absent | absent | nothing |
/// | absent | present | set type and fields (error if the type id is blank) |
/// | present | absent | remove type |
/// | same type | same type | one set-field action per changed or removed field |
/// | other type | other type | set type and fields |
pub fn build_custom_update_actions<B: CustomActionBuilder>(
    old: Option<&CustomFieldSet>,
    new: Option<&CustomFieldSet>,
    builder: &B,
) -> DiffResult<Vec<B::Action>> {
    match (old, new) {
        (None, None) => Ok(Vec::new()),
        (None, Some(new)) => set_type(new, builder).map(|action| vec![action]),
        (Some(_), None) => Ok(vec![builder.remove_custom_type()]),
        (Some(old), Some(new)) if old.type_id == new.type_id => {
            if is_blank(&old.type_id) {
                return Err(DiffError::CustomTypeIdsNotSet {
                    target: builder.target(),
                });
            }
            Ok(build_set_custom_fields_actions(&old.fields, &new.fields, builder))
        }
        (Some(_), Some(new)) => set_type(new, builder).map(|action| vec![action]),
    }
}

/// Per-field comparison of two field maps of the same type.
///
/// New or changed fields come first (in field-name order), followed by
/// fields present in `old` but absent or `null` in `new`, which are unset.
pub fn build_set_custom_fields_actions<B: CustomActionBuilder>(
    old: &FieldValues,
    new: &FieldValues,
    builder: &B,
) -> Vec<B::Action> {
    let changed = new
        .iter()
        .filter(|(name, value)| !json_opt_eq(old.get(name.as_str()), Some(value)))
        .filter(|(_, value)| !value.is_null())
        .map(|(name, value)| builder.set_custom_field(name, Some(value)));

    let removed = old
        .iter()
        .filter(|(_, value)| !value.is_null())
        .filter(|(name, _)| non_null(new.get(name.as_str())).is_none())
        .map(|(name, _)| builder.set_custom_field(name, None));

    changed.chain(removed).collect()
}

fn set_type<B: CustomActionBuilder>(new: &CustomFieldSet, builder: &B) -> DiffResult<B::Action> {
    if is_blank(&new.type_id) {
        return Err(DiffError::BlankCustomTypeId {
            target: builder.target(),
        });
    }
    Ok(builder.set_custom_type(&new.type_id, &new.fields))
}
