//! Assets: ordered, keyed media entries owned by a resource.

use crate::custom::CustomFieldSet;
use crate::localized::LocalizedString;
use serde::{Deserialize, Serialize};

/// A single binary source (file, URL) of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSource {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl AssetSource {
    pub fn of_uri(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Default::default()
        }
    }
}

/// An asset as stored on the platform.
///
/// `id` is platform generated; `key` is human assigned and may be missing on
/// assets created by older tooling.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub name: LocalizedString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<LocalizedString>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sources: Vec<AssetSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomFieldSet>,
}

/// Desired state of an asset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub name: LocalizedString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<LocalizedString>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sources: Vec<AssetSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomFieldSet>,
}

impl AssetDraft {
    pub fn new(key: impl Into<String>, name: LocalizedString) -> Self {
        Self {
            key: Some(key.into()),
            name,
            ..Default::default()
        }
    }
}

impl From<&Asset> for AssetDraft {
    fn from(asset: &Asset) -> Self {
        Self {
            key: asset.key.clone(),
            name: asset.name.clone(),
            description: asset.description.clone(),
            tags: asset.tags.clone(),
            sources: asset.sources.clone(),
            custom: asset.custom.clone(),
        }
    }
}
