//! Shared data model for catsync.
//!
//! This crate defines the plain, platform-agnostic values the diff engine
//! compares and the sync engine moves around:
//! - Custom field sets (a schema type id plus named JSON values)
//! - Resource identifiers (by platform id or by human-assigned key)
//! - Localized strings
//! - Assets and asset drafts
//! - Plain and localized enum values
//!
//! Resource-specific shapes (categories, products, ...) live next to the
//! sync logic that owns them, not here.

mod asset;
mod custom;
mod enum_value;
mod keys;
mod localized;
mod reference;

pub use asset::{Asset, AssetDraft, AssetSource};
pub use custom::{CustomFieldSet, FieldValues};
pub use enum_value::{EnumValue, LocalizedEnumValue, PlainEnumValue};
pub use keys::{is_blank, is_blank_opt};
pub use localized::LocalizedString;
pub use reference::ResourceIdentifier;
