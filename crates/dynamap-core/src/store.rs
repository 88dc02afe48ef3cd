//! Abstract store collaborator the facade delegates to.
//!
//! The adapter never talks to a backend directly; it builds one wire-format
//! parameter object per call and hands it to a [`Store`] implementation.
//! Production implementations wrap a network client; tests use an in-memory
//! double that records the requests it receives.

use async_trait::async_trait;
use thiserror::Error;

use dynamap_model::input::{
    BatchGetItemInput, CreateTableInput, DeleteItemInput, DeleteTableInput, GetItemInput,
    PutItemInput, QueryInput, ScanInput, UpdateItemInput,
};
use dynamap_model::output::{
    BatchGetItemOutput, CreateTableOutput, DeleteItemOutput, DeleteTableOutput, GetItemOutput,
    ListTablesOutput, PutItemOutput, QueryOutput, ScanOutput, UpdateItemOutput,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A failure reported by the store collaborator.
///
/// The adapter treats these as opaque and propagates them unchanged; it
/// never retries.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named table does not exist.
    #[error("table not found: {table}")]
    TableNotFound {
        /// The table name the request addressed.
        table: String,
    },
    /// The store rejected the request parameters.
    #[error("store rejected request: {message}")]
    Rejected {
        /// The store's error description.
        message: String,
    },
    /// The store could not be reached or the call failed in transport.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// The transport error description.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Store contract
// ---------------------------------------------------------------------------

/// The operations a backing store must provide.
///
/// Every method takes an already-built wire parameter object and returns the
/// store's raw result. Implementations hold whatever connection state they
/// need; the adapter only requires `Send + Sync` so it can be shared across
/// tasks.
#[async_trait]
pub trait Store: Send + Sync {
    /// List the names of all tables.
    async fn list_tables(&self) -> Result<ListTablesOutput, StoreError>;

    /// Create a table from a compiled table plan.
    async fn create_table(&self, input: CreateTableInput)
    -> Result<CreateTableOutput, StoreError>;

    /// Delete a table by name.
    async fn delete_table(&self, input: DeleteTableInput)
    -> Result<DeleteTableOutput, StoreError>;

    /// Write a full item.
    async fn put_item(&self, input: PutItemInput) -> Result<PutItemOutput, StoreError>;

    /// Fetch one item by its full primary key.
    async fn get_item(&self, input: GetItemInput) -> Result<GetItemOutput, StoreError>;

    /// Query items through an index.
    async fn query(&self, input: QueryInput) -> Result<QueryOutput, StoreError>;

    /// Scan a table, optionally filtered.
    async fn scan(&self, input: ScanInput) -> Result<ScanOutput, StoreError>;

    /// Apply an update expression to one item.
    async fn update_item(&self, input: UpdateItemInput)
    -> Result<UpdateItemOutput, StoreError>;

    /// Delete one item by its full primary key.
    async fn delete_item(&self, input: DeleteItemInput)
    -> Result<DeleteItemOutput, StoreError>;

    /// Fetch many items by key in one round trip.
    async fn batch_get_item(
        &self,
        input: BatchGetItemInput,
    ) -> Result<BatchGetItemOutput, StoreError>;
}
