use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::collections::BTreeSet;

/// A draft that can be parked in the deferred store.
pub trait DeferredDraft: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// The draft's natural key, if it has one.
    fn natural_key(&self) -> Option<&str>;
}

/// A draft waiting for referenced resources to appear.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredRecord<D> {
    /// Storage key: [`hash_key`] of the draft's natural key.
    pub key: String,
    pub draft: D,
    /// Keys of referenced resources that did not exist when the draft was
    /// parked. Advisory only.
    pub missing_keys: BTreeSet<String>,
    pub last_modified_at: DateTime<Utc>,
    pub version: u64,
}

/// Stored value of a record.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredValue<D> {
    pub draft: D,
    #[serde(default)]
    pub missing_referenced_keys: BTreeSet<String>,
}

/// Storage key for a natural key: lowercase hex SHA-1 digest (40 chars).
///
/// ```
/// use catsync_deferred::hash_key;
///
/// assert_eq!(hash_key("k1"), "a2ab1959c1c3bfa295b0fc90199378272db76b45");
/// ```
pub fn hash_key(natural_key: &str) -> String {
    hex::encode(Sha1::digest(natural_key.as_bytes()))
}
