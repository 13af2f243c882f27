//! Cross-resource references.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Points at another resource either by platform-generated id or by key.
///
/// Existing resources returned by the platform reference by id; drafts built
/// from a source project reference by key so they stay portable between
/// projects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl ResourceIdentifier {
    pub fn of_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            key: None,
        }
    }

    pub fn of_key(key: impl Into<String>) -> Self {
        Self {
            id: None,
            key: Some(key.into()),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.key, &self.id) {
            (Some(key), _) => write!(f, "key:{key}"),
            (None, Some(id)) => write!(f, "id:{id}"),
            (None, None) => write!(f, "<unset>"),
        }
    }
}
