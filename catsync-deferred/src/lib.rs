//! Deferred-resolution store for catsync.
//!
//! A draft that references resources which do not exist yet cannot be
//! created. Instead of failing it, the sync engine parks it here together
//! with the keys it is waiting for, and picks it up again once those
//! resources have been created.
//!
//! Records live in a remote container/key store reached through a
//! [`KeyValueClient`]. Storage keys are SHA-1 digests of the drafts'
//! natural keys, which keeps them inside the platform's key constraints and
//! makes saving idempotent.
//!
//! Stale records are garbage-collected by [`Cleanup`].

mod cleanup;
mod client;
mod error;
mod http;
mod memory;
mod record;
mod store;

pub use cleanup::{
    Cleanup, CleanupStatistics, CATEGORY_CONTAINER, DEFAULT_CONTAINERS, PRODUCT_CONTAINER,
    STATE_CONTAINER,
};
pub use client::{KeyValueClient, PageRequest, Query, StoredEntry};
pub use error::{DeferredError, DeferredResult};
pub use http::{HttpKeyValueClient, HttpStoreConfig};
pub use memory::MemoryKeyValueClient;
pub use record::{hash_key, DeferredDraft, DeferredRecord};
pub use store::DeferredStore;
