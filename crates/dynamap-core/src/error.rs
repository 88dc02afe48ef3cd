//! Error taxonomy for model compilation and facade operations.

use crate::store::StoreError;

/// Errors produced by schema compilation, expression compilation, and the
/// CRUD facade.
///
/// Store failures are propagated unchanged inside [`ModelError::Store`];
/// everything else is detected before any store call is issued.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// An index declaration carries an unrecognized key kind.
    #[error("model has invalid index: unrecognized keytype '{keytype}'")]
    InvalidModel {
        /// The unrecognized keytype string.
        keytype: String,
    },

    /// The requested schema version is not registered.
    #[error("no schema registered for version '{version}'")]
    MissingSchemaVersion {
        /// The version that was requested.
        version: String,
    },

    /// A read was keyed on an attribute not covered by any declared index.
    #[error("no index declared for attribute '{attribute}'")]
    NoMatchingIndex {
        /// The attribute name that matched no index.
        attribute: String,
    },

    /// A filter clause used an operator outside the recognized sets.
    #[error("unsupported filter operator '{operator}' for attribute '{attribute}'")]
    UnsupportedOperator {
        /// The attribute the clause applied to.
        attribute: String,
        /// The unrecognized operator.
        operator: String,
    },

    /// A tokenized string filter clause could not be parsed.
    #[error("malformed filter clause '{clause}'")]
    MalformedClause {
        /// The clause text that failed to parse.
        clause: String,
    },

    /// The pluggable validator rejected an item.
    #[error("validation failed: {message}")]
    Validation {
        /// The validator's error description.
        message: String,
    },

    /// A batch get was issued with no key values.
    #[error("batch get requires at least one value")]
    EmptyBatch,

    /// A pagination token could not be parsed as the store's cursor format.
    #[error("malformed pagination token: {reason}")]
    BadCursor {
        /// Why the token was rejected.
        reason: String,
    },

    /// A failure returned by the store collaborator, propagated unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),
}
