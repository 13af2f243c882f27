//! Key-value persistence abstraction.
//!
//! Deferred records live in the platform's container/key store. The
//! [`KeyValueClient`] trait is the seam between the store logic and the
//! concrete backend ([`HttpKeyValueClient`](crate::HttpKeyValueClient) or
//! [`MemoryKeyValueClient`](crate::MemoryKeyValueClient)).

use async_trait::async_trait;
use catsync_batch::RequestError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of a container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEntry {
    pub container: String,
    pub key: String,
    pub value: Value,
    pub version: u64,
    pub last_modified_at: DateTime<Utc>,
}

/// Predicate selecting entries of one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Entries whose key is one of the given keys.
    KeysIn(Vec<String>),
    /// Entries not modified since the given instant.
    LastModifiedBefore(DateTime<Utc>),
}

impl Query {
    /// The platform's `where` predicate for this query.
    ///
    /// ```
    /// use catsync_deferred::Query;
    ///
    /// let query = Query::KeysIn(vec!["a".into(), "b".into()]);
    /// assert_eq!(query.to_predicate(), r#"key in ("a", "b")"#);
    /// ```
    pub fn to_predicate(&self) -> String {
        match self {
            Query::KeysIn(keys) => {
                let quoted: Vec<String> = keys.iter().map(|key| format!("\"{key}\"")).collect();
                format!("key in ({})", quoted.join(", "))
            }
            Query::LastModifiedBefore(instant) => format!(
                "lastModifiedAt < \"{}\"",
                instant.to_rfc3339_opts(SecondsFormat::Millis, true)
            ),
        }
    }

    pub fn matches(&self, entry: &StoredEntry) -> bool {
        match self {
            Query::KeysIn(keys) => keys.contains(&entry.key),
            Query::LastModifiedBefore(instant) => entry.last_modified_at < *instant,
        }
    }
}

/// Window into a result set. Results are sorted by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: usize,
    pub offset: usize,
}

impl PageRequest {
    pub fn first(limit: usize) -> Self {
        Self { limit, offset: 0 }
    }
}

/// Access to a container/key store.
#[async_trait]
pub trait KeyValueClient: Send + Sync {
    /// Returns the entry, or `None` if it does not exist.
    async fn get(&self, container: &str, key: &str) -> Result<Option<StoredEntry>, RequestError>;

    /// Returns one page of the entries of `container` matching `query`.
    async fn query(
        &self,
        container: &str,
        query: &Query,
        page: PageRequest,
    ) -> Result<Vec<StoredEntry>, RequestError>;

    /// Creates or replaces an entry.
    async fn upsert(&self, container: &str, key: &str, value: Value) -> Result<StoredEntry, RequestError>;

    /// Deletes an entry, returning it. Fails with [`RequestError::NotFound`]
    /// if it does not exist.
    async fn delete(&self, container: &str, key: &str) -> Result<StoredEntry, RequestError>;
}
