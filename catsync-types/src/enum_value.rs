//! Enum values of enum-typed attribute and field definitions.

use crate::localized::LocalizedString;
use serde::{Deserialize, Serialize};

/// Common view over plain and localized enum values.
pub trait EnumValue: Clone + PartialEq {
    /// The key identifying the value inside its definition.
    fn key(&self) -> &str;

    /// Returns true if the labels of the two values differ.
    fn label_differs(&self, other: &Self) -> bool;
}

/// An enum value with a single-language label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlainEnumValue {
    pub key: String,
    pub label: String,
}

impl PlainEnumValue {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

impl EnumValue for PlainEnumValue {
    fn key(&self) -> &str {
        &self.key
    }

    fn label_differs(&self, other: &Self) -> bool {
        self.label != other.label
    }
}

/// An enum value with a localized label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalizedEnumValue {
    pub key: String,
    pub label: LocalizedString,
}

impl LocalizedEnumValue {
    pub fn new(key: impl Into<String>, label: LocalizedString) -> Self {
        Self {
            key: key.into(),
            label,
        }
    }
}

impl EnumValue for LocalizedEnumValue {
    fn key(&self) -> &str {
        &self.key
    }

    fn label_differs(&self, other: &Self) -> bool {
        self.label != other.label
    }
}
