//! Update-action diff engine for catsync.
//!
//! Given the current state of a resource and a desired draft, the functions
//! in this crate compute the ordered list of update actions that turns one
//! into the other:
//!
//! - [`custom`]: custom field sets (type changes, per-field set/unset)
//! - [`collection`]: generic reconciliation of ordered, keyed item lists
//! - [`assets`]: asset lists, built on [`collection`] and [`custom`]
//! - [`enums`]: plain and localized enum-value lists, built on [`collection`]
//! - [`field`]: one-to-one comparison helpers for simple values
//!
//! # Action ordering
//!
//! Within one result, actions are ordered so the platform can apply them in
//! sequence: removals and per-item modifications first, then at most one
//! reorder action, then additions. Reordering needs the ids of existing
//! items, and appending additions afterwards keeps them from triggering a
//! second reorder.
//!
//! # Errors
//!
//! Malformed drafts (blank type ids, duplicate or missing keys) are reported
//! as [`DiffError`] and produce no partial action list. Failures scoped to one
//! item of a collection are handed to the [`DiffObserver`] and only that
//! item's actions are dropped.

pub mod assets;
pub mod collection;
pub mod custom;
pub mod enums;
mod error;
pub mod field;
pub mod json;
mod observer;

pub use assets::{build_assets_update_actions, AssetAction};
pub use collection::{reconcile, CollectionActions};
pub use custom::{build_custom_update_actions, build_set_custom_fields_actions, CustomActionBuilder};
pub use enums::{build_enum_values_update_actions, EnumValueAction};
pub use error::{DiffError, DiffResult};
pub use field::build_update_action;
pub use json::json_eq;
pub use observer::{DiffObserver, NoopObserver, RecordingObserver};
