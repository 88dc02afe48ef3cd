//! CRUD facade over the store collaborator.
//!
//! The adapter owns a [`SchemaRegistry`] and a [`Store`] implementation and
//! exposes one method per operation. Each call resolves the schema version,
//! compiles whatever plan or expression it needs, builds a single wire
//! parameter object and delegates to the store. Nothing is retried and no
//! partial parameter object is ever sent.

use std::collections::HashSet;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use dynamap_model::input::{
    BatchGetItemInput, CreateTableInput, DeleteItemInput, DeleteTableInput, GetItemInput,
    PutItemInput, QueryInput, ScanInput, UpdateItemInput,
};
use dynamap_model::types::{
    Item, Key, KeysAndAttributes, ReturnValue, TableDescription,
};

use crate::config::AdapterConfig;
use crate::error::ModelError;
use crate::filter::{update_expression, Filter};
use crate::plan::build_table_plan;
use crate::schema::{KeyKind, ModelSchema, SchemaRegistry};
use crate::store::Store;

/// Hook applied to every item flowing back to the caller.
pub type Sanitizer = dyn Fn(Item) -> Item + Send + Sync;

/// Hook applied to caller-supplied items before they are written.
pub type Validator = dyn Fn(&Item) -> Result<(), String> + Send + Sync;

// ---------------------------------------------------------------------------
// Call results
// ---------------------------------------------------------------------------

/// Result of a keyed read.
///
/// A read keyed on the hash key addresses at most one item; a read keyed on
/// an indexed attribute is a query and may match many.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadResult {
    /// Primary-key lookup: the item, if present.
    Item(Option<Item>),
    /// Index query: every matching item.
    Items(Vec<Item>),
}

impl ReadResult {
    /// Flatten into a list regardless of which kind of read produced it.
    #[must_use]
    pub fn into_items(self) -> Vec<Item> {
        match self {
            Self::Item(item) => item.into_iter().collect(),
            Self::Items(items) => items,
        }
    }
}

/// Pagination controls for [`Adapter::scan`] and [`Adapter::read_paginate`].
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Page size; falls back to the configured default when absent.
    pub limit: Option<i32>,
    /// Opaque continuation token from a previous page's [`Page::last_key`].
    pub last_key: Option<String>,
}

/// One page of results plus the token to continue from, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Items on this page, sanitized.
    pub items: Vec<Item>,
    /// Continuation token; `None` when the scan or query is exhausted.
    pub last_key: Option<String>,
}

/// Outcome of an idempotent table creation.
#[derive(Debug, Clone, PartialEq)]
pub struct TableCreation {
    /// The table addressed by the request.
    pub table_name: String,
    /// True when the table already existed and no create call was issued.
    pub existed: bool,
    /// The store's description of a newly created table.
    pub description: Option<TableDescription>,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`Adapter`]; hooks and schemas are fixed at construction.
pub struct AdapterBuilder<S> {
    store: S,
    registry: SchemaRegistry,
    config: AdapterConfig,
    sanitizer: Option<Box<Sanitizer>>,
    validator: Option<Box<Validator>>,
}

impl<S: Store> AdapterBuilder<S> {
    /// Start a builder around a store implementation.
    pub fn new(store: S) -> Self {
        Self {
            store,
            registry: SchemaRegistry::default(),
            config: AdapterConfig::default(),
            sanitizer: None,
            validator: None,
        }
    }

    /// Register a schema version; the last registration becomes the default.
    #[must_use]
    pub fn schema(mut self, schema: ModelSchema) -> Self {
        self.registry.register(schema.version.clone(), schema);
        self
    }

    /// Override the default configuration.
    #[must_use]
    pub fn config(mut self, config: AdapterConfig) -> Self {
        self.config = config;
        self
    }

    /// Install a sanitizer applied to every item returned to the caller.
    #[must_use]
    pub fn sanitizer(mut self, f: impl Fn(Item) -> Item + Send + Sync + 'static) -> Self {
        self.sanitizer = Some(Box::new(f));
        self
    }

    /// Install a validator applied to items before writes.
    #[must_use]
    pub fn validator(
        mut self,
        f: impl Fn(&Item) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Box::new(f));
        self
    }

    /// Finish construction.
    pub fn build(self) -> Adapter<S> {
        Adapter {
            store: self.store,
            registry: self.registry,
            config: self.config,
            sanitizer: self.sanitizer,
            validator: self.validator,
            checked_tables: Mutex::new(HashSet::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

/// Schema-driven access layer over a [`Store`].
pub struct Adapter<S> {
    store: S,
    registry: SchemaRegistry,
    config: AdapterConfig,
    sanitizer: Option<Box<Sanitizer>>,
    validator: Option<Box<Validator>>,
    // Tables already confirmed to exist, so auto-create probes the store
    // once per table per process.
    checked_tables: Mutex<HashSet<String>>,
}

impl<S: Store> Adapter<S> {
    /// Start building an adapter around a store.
    pub fn builder(store: S) -> AdapterBuilder<S> {
        AdapterBuilder::new(store)
    }

    /// The registered schemas.
    #[must_use]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    fn schema(&self, version: Option<&str>) -> Result<&ModelSchema, ModelError> {
        self.registry.resolve(version)
    }

    fn sanitize(&self, item: Item) -> Item {
        match &self.sanitizer {
            Some(f) => f(item),
            None => item,
        }
    }

    fn validate(&self, item: &Item) -> Result<(), ModelError> {
        match &self.validator {
            Some(f) => f(item).map_err(|message| ModelError::Validation { message }),
            None => Ok(()),
        }
    }

    /// Create the schema's table on first use when the schema is flagged
    /// for auto-creation. Subsequent calls for the same table are no-ops.
    async fn ensure_table(&self, schema: &ModelSchema) -> Result<(), ModelError> {
        if !schema.auto_create || !self.config.auto_create {
            return Ok(());
        }
        if self.checked_tables.lock().contains(&schema.table_name) {
            return Ok(());
        }
        let tables = self.store.list_tables().await?;
        if !tables.table_names.contains(&schema.table_name) {
            debug!(table = %schema.table_name, "auto-creating missing table");
            let plan = build_table_plan(schema)?;
            self.store.create_table(plan).await?;
        }
        self.checked_tables.lock().insert(schema.table_name.clone());
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Tables
    // -----------------------------------------------------------------------

    /// List the names of every table the store knows about.
    pub async fn list(&self) -> Result<Vec<String>, ModelError> {
        Ok(self.store.list_tables().await?.table_names)
    }

    /// Create the table described by the resolved schema version.
    ///
    /// Idempotent: when the table already exists no create call is issued
    /// and the result carries `existed: true`.
    pub async fn create_table_from_model(
        &self,
        version: Option<&str>,
    ) -> Result<TableCreation, ModelError> {
        let schema = self.schema(version)?;
        let plan = build_table_plan(schema)?;
        self.create_table(plan).await
    }

    /// Create a table from explicit creation parameters, skipping the call
    /// when the table already exists.
    pub async fn create_table(
        &self,
        input: CreateTableInput,
    ) -> Result<TableCreation, ModelError> {
        let tables = self.store.list_tables().await?;
        if tables.table_names.contains(&input.table_name) {
            debug!(table = %input.table_name, "table already exists, skipping create");
            return Ok(TableCreation {
                table_name: input.table_name,
                existed: true,
                description: None,
            });
        }
        let table_name = input.table_name.clone();
        let output = self.store.create_table(input).await?;
        Ok(TableCreation {
            table_name,
            existed: false,
            description: output.table_description,
        })
    }

    /// Delete the resolved schema version's table.
    pub async fn delete_table(
        &self,
        version: Option<&str>,
    ) -> Result<Option<TableDescription>, ModelError> {
        let schema = self.schema(version)?;
        let output = self
            .store
            .delete_table(DeleteTableInput {
                table_name: schema.table_name.clone(),
            })
            .await?;
        Ok(output.table_description)
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    /// Write a full item, returning it unchanged on success.
    pub async fn create(&self, item: Item, version: Option<&str>) -> Result<Item, ModelError> {
        let schema = self.schema(version)?;
        self.validate(&item)?;
        self.ensure_table(schema).await?;
        debug!(table = %schema.table_name, "putting item");
        self.store
            .put_item(PutItemInput {
                table_name: schema.table_name.clone(),
                item: item.clone(),
                return_values: Some(ReturnValue::None),
            })
            .await?;
        Ok(item)
    }

    /// Read by key, dispatching on how the key attribute is indexed.
    ///
    /// When any supplied attribute is the hash key, the whole key object is
    /// treated as the primary key and fetched directly; otherwise the first
    /// indexed attribute drives an index query. A key matching no declared
    /// index fails with [`ModelError::NoMatchingIndex`].
    pub async fn read(&self, key: &Key, version: Option<&str>) -> Result<ReadResult, ModelError> {
        let schema = self.schema(version)?;
        let mut indexed = None;
        for attribute in key.keys() {
            match schema.index_for(attribute) {
                Some(KeyKind::Hash) => {
                    return Ok(ReadResult::Item(self.get_item_by_hash(key, version).await?));
                }
                Some(_) if indexed.is_none() => indexed = Some(attribute.clone()),
                _ => {}
            }
        }
        match indexed {
            Some(_) => Ok(ReadResult::Items(self.get_items_by_index(key, version).await?)),
            None => Err(ModelError::NoMatchingIndex {
                attribute: key.keys().next().cloned().unwrap_or_default(),
            }),
        }
    }

    /// Fetch one item by its full primary key (hash, or hash plus range).
    pub async fn get_item_by_hash(
        &self,
        key: &Key,
        version: Option<&str>,
    ) -> Result<Option<Item>, ModelError> {
        let schema = self.schema(version)?;
        self.ensure_table(schema).await?;
        let output = self
            .store
            .get_item(GetItemInput {
                table_name: schema.table_name.clone(),
                key: key.clone(),
            })
            .await?;
        Ok(output.item.map(|item| self.sanitize(item)))
    }

    /// Query every item matching an indexed attribute's value.
    ///
    /// The index is addressed by the `{attribute}-index` naming convention
    /// the table plan builder uses for simple secondary indexes.
    pub async fn get_items_by_index(
        &self,
        key: &Key,
        version: Option<&str>,
    ) -> Result<Vec<Item>, ModelError> {
        let schema = self.schema(version)?;
        self.ensure_table(schema).await?;
        let input = indexed_query(schema, key, None, Key::new())?;
        let output = self.store.query(input).await?;
        Ok(output
            .items
            .into_iter()
            .map(|item| self.sanitize(item))
            .collect())
    }

    /// Query an indexed attribute one page at a time.
    pub async fn read_paginate(
        &self,
        key: &Key,
        options: &ScanOptions,
        version: Option<&str>,
    ) -> Result<Page, ModelError> {
        let schema = self.schema(version)?;
        self.ensure_table(schema).await?;
        let limit = options.limit.unwrap_or(self.config.default_page_limit);
        let start_key = parse_last_key(options.last_key.as_deref())?;
        let input = indexed_query(schema, key, Some(limit), start_key)?;
        let output = self.store.query(input).await?;
        Ok(Page {
            items: output
                .items
                .into_iter()
                .map(|item| self.sanitize(item))
                .collect(),
            last_key: serialize_last_key(&output.last_evaluated_key),
        })
    }

    /// Scan the table, optionally filtered, one page at a time.
    ///
    /// A malformed continuation token fails the call rather than silently
    /// scanning from the start.
    pub async fn scan(
        &self,
        filter: Option<&Filter>,
        options: &ScanOptions,
        version: Option<&str>,
    ) -> Result<Page, ModelError> {
        let schema = self.schema(version)?;
        self.ensure_table(schema).await?;

        let mut input = ScanInput {
            table_name: schema.table_name.clone(),
            filter_expression: None,
            expression_attribute_names: Default::default(),
            expression_attribute_values: Default::default(),
            limit: Some(options.limit.unwrap_or(self.config.default_page_limit)),
            exclusive_start_key: parse_last_key(options.last_key.as_deref())?,
        };
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            let compiled = filter.compile()?;
            debug!(table = %schema.table_name, expression = %compiled.filter_expression, "scanning with filter");
            input.filter_expression = Some(compiled.filter_expression);
            input.expression_attribute_names = compiled.expression_attribute_names;
            input.expression_attribute_values = compiled.expression_attribute_values;
        }

        let output = self.store.scan(input).await?;
        Ok(Page {
            items: output
                .items
                .into_iter()
                .map(|item| self.sanitize(item))
                .collect(),
            last_key: serialize_last_key(&output.last_evaluated_key),
        })
    }

    /// Apply a partial update, returning the full post-update item.
    ///
    /// Attributes also present in the key object are stripped from the
    /// patch; the store rejects updates that rewrite key fields.
    pub async fn update(
        &self,
        key: &Key,
        patch: Item,
        version: Option<&str>,
    ) -> Result<Item, ModelError> {
        let schema = self.schema(version)?;
        self.validate(&patch)?;
        let patch = strip_key_fields(patch, key);
        let expression = update_expression(&patch)?;
        self.ensure_table(schema).await?;
        debug!(table = %schema.table_name, expression = %expression.update_expression, "updating item");
        let output = self
            .store
            .update_item(UpdateItemInput {
                table_name: schema.table_name.clone(),
                key: key.clone(),
                update_expression: expression.update_expression,
                expression_attribute_names: expression.expression_attribute_names,
                expression_attribute_values: expression.expression_attribute_values,
                return_values: Some(ReturnValue::AllNew),
            })
            .await?;
        Ok(self.sanitize(output.attributes))
    }

    /// Apply a partial update; same contract as [`Adapter::update`].
    pub async fn patch(
        &self,
        key: &Key,
        patch: Item,
        version: Option<&str>,
    ) -> Result<Item, ModelError> {
        self.update(key, patch, version).await
    }

    /// Delete one item by its full primary key, returning the store's raw
    /// deletion response.
    pub async fn delete(&self, key: &Key, version: Option<&str>) -> Result<Item, ModelError> {
        let schema = self.schema(version)?;
        let output = self
            .store
            .delete_item(DeleteItemInput {
                table_name: schema.table_name.clone(),
                key: key.clone(),
            })
            .await?;
        Ok(output.attributes)
    }

    /// Fetch every item whose key attribute takes one of the given values.
    ///
    /// Fails with [`ModelError::EmptyBatch`] before contacting the store
    /// when no values are supplied.
    pub async fn get_items_in_array(
        &self,
        attribute: &str,
        values: &[Value],
        version: Option<&str>,
    ) -> Result<Vec<Item>, ModelError> {
        if values.is_empty() {
            return Err(ModelError::EmptyBatch);
        }
        let schema = self.schema(version)?;
        self.ensure_table(schema).await?;

        let keys = values
            .iter()
            .map(|value| Key::from([(attribute.to_owned(), value.clone())]))
            .collect();
        let mut request_items = std::collections::HashMap::new();
        request_items.insert(
            schema.table_name.clone(),
            KeysAndAttributes {
                keys,
                consistent_read: None,
            },
        );

        let output = self
            .store
            .batch_get_item(BatchGetItemInput { request_items })
            .await?;
        Ok(output
            .responses
            .get(&schema.table_name)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|item| self.sanitize(item))
            .collect())
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for Adapter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter")
            .field("store", &self.store)
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("sanitizer", &self.sanitizer.is_some())
            .field("validator", &self.validator.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for AdapterBuilder<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterBuilder")
            .field("store", &self.store)
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Parameter helpers
// ---------------------------------------------------------------------------

/// Build a query against the `{attribute}-index` for a one-attribute key.
fn indexed_query(
    schema: &ModelSchema,
    key: &Key,
    limit: Option<i32>,
    exclusive_start_key: Key,
) -> Result<QueryInput, ModelError> {
    let Some((attribute, value)) = key.iter().next() else {
        return Err(ModelError::NoMatchingIndex {
            attribute: String::new(),
        });
    };
    Ok(QueryInput {
        table_name: schema.table_name.clone(),
        index_name: Some(format!("{attribute}-index")),
        key_condition_expression: format!("{attribute} = :hk_val"),
        expression_attribute_values: std::collections::HashMap::from([(
            ":hk_val".to_owned(),
            value.clone(),
        )]),
        limit,
        exclusive_start_key,
    })
}

/// Drop patch fields that are part of the key.
fn strip_key_fields(mut patch: Item, key: &Key) -> Item {
    for attribute in key.keys() {
        patch.remove(attribute);
    }
    patch
}

/// Parse an opaque continuation token back into the store's cursor format.
fn parse_last_key(last_key: Option<&str>) -> Result<Key, ModelError> {
    match last_key {
        None => Ok(Key::new()),
        Some(raw) => serde_json::from_str(raw).map_err(|e| ModelError::BadCursor {
            reason: e.to_string(),
        }),
    }
}

/// Serialize a cursor into the opaque token handed back to callers.
fn serialize_last_key(last_key: &Key) -> Option<String> {
    if last_key.is_empty() {
        return None;
    }
    serde_json::to_string(last_key).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use dynamap_model::types::ScalarAttributeType;
    use crate::schema::IndexSpec;

    fn user_schema() -> ModelSchema {
        ModelSchema {
            name: "user".to_owned(),
            version: "1".to_owned(),
            table_name: "users".to_owned(),
            auto_create: false,
            indexes: vec![
                IndexSpec::hash("id", ScalarAttributeType::S),
                IndexSpec::secondary("authId", ScalarAttributeType::S),
            ],
        }
    }

    #[test]
    fn test_should_strip_key_fields_from_patch() {
        let key = Key::from([("id".to_owned(), json!("abc123"))]);
        let mut patch: Item = Item::new();
        patch.insert("id".to_owned(), json!("evil-overwrite"));
        patch.insert("email".to_owned(), json!("new@ben.com"));
        let stripped = strip_key_fields(patch, &key);
        assert!(!stripped.contains_key("id"));
        assert_eq!(stripped["email"], json!("new@ben.com"));
    }

    #[test]
    fn test_should_build_indexed_query_against_named_index() {
        let key = Key::from([("authId".to_owned(), json!("1234"))]);
        let input = indexed_query(&user_schema(), &key, Some(10), Key::new()).expect("query");
        assert_eq!(input.index_name.as_deref(), Some("authId-index"));
        assert_eq!(input.key_condition_expression, "authId = :hk_val");
        assert_eq!(input.expression_attribute_values[":hk_val"], json!("1234"));
        assert_eq!(input.limit, Some(10));
    }

    #[test]
    fn test_should_reject_malformed_pagination_token() {
        let err = parse_last_key(Some("{not json")).unwrap_err();
        assert!(matches!(err, ModelError::BadCursor { .. }));
    }

    #[test]
    fn test_should_round_trip_pagination_token() {
        let cursor = Key::from([("id".to_owned(), json!("last-seen"))]);
        let token = serialize_last_key(&cursor).expect("token");
        assert_eq!(parse_last_key(Some(&token)).expect("parse"), cursor);
        assert!(serialize_last_key(&Key::new()).is_none());
    }

    #[test]
    fn test_should_flatten_read_results() {
        let item = Item::from([("id".to_owned(), json!("a"))]);
        assert_eq!(ReadResult::Item(None).into_items().len(), 0);
        assert_eq!(ReadResult::Item(Some(item.clone())).into_items().len(), 1);
        assert_eq!(
            ReadResult::Items(vec![item.clone(), item]).into_items().len(),
            2
        );
    }
}
