//! Schema-driven access layer over a sparse, secondary-indexed key-value store.
//!
//! The core of this crate is the schema-to-query compiler: [`plan`] maps a
//! versioned model schema to the store's table-definition wire format, and
//! [`filter`] compiles structured or string filter specifications into the
//! store's placeholder-based expression syntax. [`adapter`] wraps both in a
//! uniform CRUD+scan facade that delegates to an abstract [`store::Store`]
//! collaborator.
#![allow(clippy::module_name_repetitions)]

pub mod adapter;
pub mod config;
pub mod error;
pub mod filter;
pub mod plan;
pub mod schema;
pub mod store;

pub use adapter::{Adapter, AdapterBuilder, Page, ReadResult, ScanOptions, TableCreation};
pub use config::AdapterConfig;
pub use error::ModelError;
pub use filter::{update_expression, CompiledExpression, Filter, FilterClause, UpdateExpression};
pub use schema::{IndexSpec, KeyKind, ModelSchema, SchemaRegistry};
pub use store::{Store, StoreError};
