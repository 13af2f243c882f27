//! Custom field sets attached to resources and sub-items.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Field name → JSON value. Names are unique by construction.
pub type FieldValues = BTreeMap<String, Value>;

/// A typed, named bag of values attached to a resource.
///
/// `type_id` is the platform id of the schema (type) resource that defines
/// the fields. A set is a read-only snapshot: it is compared, never mutated
/// in place by the diff engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldSet {
    pub type_id: String,
    #[serde(default)]
    pub fields: FieldValues,
}

impl CustomFieldSet {
    /// Creates a field set with no fields.
    pub fn new(type_id: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            fields: FieldValues::new(),
        }
    }

    /// Adds a field, replacing any previous value under the same name.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Returns the value of a field, treating JSON `null` as absent.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }
}
