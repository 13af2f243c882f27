//! Sync engine for catsync.
//!
//! Takes drafts describing the desired state of platform resources and
//! brings the platform in line with them:
//!
//! 1. drafts without a key are reported and skipped
//! 2. keys of referenced resources are resolved to ids through the
//!    [`ReferenceCache`](catsync_cache::ReferenceCache)
//! 3. drafts whose references do not exist yet are parked in the deferred
//!    store and retried once the references have been created
//! 4. existing resources are fetched by key; missing ones are created,
//!    existing ones get the update actions the diff engine computes
//!
//! The engine is generic over [`SyncableResource`]; categories are provided
//! by [`CategoryKind`].

mod category;
mod error;
mod options;
mod resource;
mod statistics;
mod sync;

pub use category::{Category, CategoryDraft, CategoryKind, CategoryUpdateAction};
pub use error::{SyncError, SyncResult};
pub use options::{SyncConfig, SyncOptions};
pub use resource::{ResourceClient, SyncableResource};
pub use statistics::SyncStatistics;
pub use sync::ResourceSync;
