//! Wire-format types for the dynamap access layer.
//!
//! These structs are the exact parameter and result shapes exchanged with the
//! underlying key-value store. Field names follow the store's `PascalCase`
//! JSON convention; optional sections are omitted entirely when absent
//! because the store treats an empty list differently from a missing field.
//!
//! Item attributes are plain [`serde_json::Value`]s, document-client style:
//! callers supply already-typed JSON and this layer passes it through
//! untouched.
#![allow(clippy::module_name_repetitions)]

pub mod input;
pub mod output;
pub mod types;

pub use types::{
    AttributeDefinition, GlobalSecondaryIndex, Item, Key, KeySchemaElement, KeyType,
    KeysAndAttributes, Projection, ProjectionType, ProvisionedThroughput, ReturnValue,
    ScalarAttributeType,
};
