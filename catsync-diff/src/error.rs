//! Error types for the diff engine.

use thiserror::Error;

/// Result type for diff operations.
pub type DiffResult<T> = Result<T, DiffError>;

/// Errors raised when a draft cannot be diffed.
///
/// All variants describe malformed input; none of them is transient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    /// The new custom field set names no type.
    #[error(
        "Failed to build custom fields update actions on the {target}. \
         Reason: New resource's custom type id is blank (empty/null)."
    )]
    BlankCustomTypeId { target: String },

    /// Old and new custom field sets share a blank type id.
    #[error(
        "Failed to build custom fields update actions on the {target}. \
         Reason: Custom type ids are not set for both the old and new {target}."
    )]
    CustomTypeIdsNotSet { target: String },

    /// Two drafts in one container share a key.
    #[error(
        "Supplied {container} have duplicate keys (duplicated key: '{key}'). \
         Keys are expected to be unique inside their container."
    )]
    DuplicateKey { container: String, key: String },

    /// A draft in a container has no usable key.
    #[error("Supplied {container} contain a draft without a key at position {position}.")]
    MissingDraftKey { container: String, position: usize },
}
