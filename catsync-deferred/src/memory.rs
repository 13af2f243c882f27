use crate::client::{KeyValueClient, PageRequest, Query, StoredEntry};
use async_trait::async_trait;
use catsync_batch::RequestError;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;

/// In-process [`KeyValueClient`] for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryKeyValueClient {
    entries: Mutex<BTreeMap<(String, String), StoredEntry>>,
}

impl MemoryKeyValueClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the modification time of an entry. Returns false if the
    /// entry does not exist.
    pub fn set_last_modified(&self, container: &str, key: &str, at: DateTime<Utc>) -> bool {
        let mut entries = self.entries.lock();
        match entries.get_mut(&(container.to_string(), key.to_string())) {
            Some(entry) => {
                entry.last_modified_at = at;
                true
            }
            None => false,
        }
    }

    /// Number of entries in `container`.
    pub fn len(&self, container: &str) -> usize {
        self.entries
            .lock()
            .keys()
            .filter(|(c, _)| c == container)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl KeyValueClient for MemoryKeyValueClient {
    async fn get(&self, container: &str, key: &str) -> Result<Option<StoredEntry>, RequestError> {
        Ok(self
            .entries
            .lock()
            .get(&(container.to_string(), key.to_string()))
            .cloned())
    }

    async fn query(
        &self,
        container: &str,
        query: &Query,
        page: PageRequest,
    ) -> Result<Vec<StoredEntry>, RequestError> {
        Ok(self
            .entries
            .lock()
            .values()
            .filter(|entry| entry.container == container && query.matches(entry))
            .skip(page.offset)
            .take(page.limit)
            .cloned()
            .collect())
    }

    async fn upsert(&self, container: &str, key: &str, value: Value) -> Result<StoredEntry, RequestError> {
        let mut entries = self.entries.lock();
        let slot = (container.to_string(), key.to_string());
        let version = entries.get(&slot).map_or(1, |existing| existing.version + 1);
        let entry = StoredEntry {
            container: container.to_string(),
            key: key.to_string(),
            value,
            version,
            last_modified_at: Utc::now(),
        };
        entries.insert(slot, entry.clone());
        Ok(entry)
    }

    async fn delete(&self, container: &str, key: &str) -> Result<StoredEntry, RequestError> {
        self.entries
            .lock()
            .remove(&(container.to_string(), key.to_string()))
            .ok_or_else(|| RequestError::NotFound(format!("{container}/{key}")))
    }
}
