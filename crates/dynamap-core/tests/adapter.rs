//! Facade tests against a recording in-memory store double.
//!
//! The mock records every wire request it receives and returns canned
//! responses, so each test can assert on the exact parameter object the
//! adapter built.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use dynamap_core::{
    Adapter, Filter, KeyKind, ModelError, ModelSchema, ReadResult, ScanOptions, Store, StoreError,
};
use dynamap_core::schema::{IndexSpec, KeyPart};
use dynamap_model::input::{
    BatchGetItemInput, CreateTableInput, DeleteItemInput, DeleteTableInput, GetItemInput,
    PutItemInput, QueryInput, ScanInput, UpdateItemInput,
};
use dynamap_model::output::{
    BatchGetItemOutput, CreateTableOutput, DeleteItemOutput, DeleteTableOutput, GetItemOutput,
    ListTablesOutput, PutItemOutput, QueryOutput, ScanOutput, UpdateItemOutput,
};
use dynamap_model::types::{Item, Key, ReturnValue, ScalarAttributeType};

// ---------------------------------------------------------------------------
// Mock store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Recorded {
    CreateTable(CreateTableInput),
    DeleteTable(DeleteTableInput),
    Put(PutItemInput),
    Get(GetItemInput),
    Query(QueryInput),
    Scan(ScanInput),
    Update(UpdateItemInput),
    Delete(DeleteItemInput),
    Batch(BatchGetItemInput),
}

#[derive(Default)]
struct MockStore {
    table_names: Mutex<Vec<String>>,
    recorded: Mutex<Vec<Recorded>>,
    item: Mutex<Option<Item>>,
    items: Mutex<Vec<Item>>,
    last_evaluated_key: Mutex<Key>,
}

impl MockStore {
    fn with_tables(names: &[&str]) -> Self {
        let store = Self::default();
        *store.table_names.lock() = names.iter().map(|n| (*n).to_owned()).collect();
        store
    }

    fn set_item(&self, item: Item) {
        *self.item.lock() = Some(item);
    }

    fn set_items(&self, items: Vec<Item>) {
        *self.items.lock() = items;
    }

    fn set_last_evaluated_key(&self, key: Key) {
        *self.last_evaluated_key.lock() = key;
    }

    fn recorded(&self) -> Vec<Recorded> {
        self.recorded.lock().clone()
    }

    fn record(&self, request: Recorded) {
        self.recorded.lock().push(request);
    }
}

#[async_trait]
impl Store for MockStore {
    async fn list_tables(&self) -> Result<ListTablesOutput, StoreError> {
        Ok(ListTablesOutput {
            table_names: self.table_names.lock().clone(),
        })
    }

    async fn create_table(
        &self,
        input: CreateTableInput,
    ) -> Result<CreateTableOutput, StoreError> {
        self.table_names.lock().push(input.table_name.clone());
        self.record(Recorded::CreateTable(input));
        Ok(CreateTableOutput {
            table_description: None,
        })
    }

    async fn delete_table(
        &self,
        input: DeleteTableInput,
    ) -> Result<DeleteTableOutput, StoreError> {
        self.table_names.lock().retain(|n| *n != input.table_name);
        self.record(Recorded::DeleteTable(input));
        Ok(DeleteTableOutput {
            table_description: None,
        })
    }

    async fn put_item(&self, input: PutItemInput) -> Result<PutItemOutput, StoreError> {
        self.record(Recorded::Put(input));
        Ok(PutItemOutput {
            attributes: Item::new(),
        })
    }

    async fn get_item(&self, input: GetItemInput) -> Result<GetItemOutput, StoreError> {
        self.record(Recorded::Get(input));
        Ok(GetItemOutput {
            item: self.item.lock().clone(),
        })
    }

    async fn query(&self, input: QueryInput) -> Result<QueryOutput, StoreError> {
        self.record(Recorded::Query(input));
        let items = self.items.lock().clone();
        Ok(QueryOutput {
            count: items.len() as i32,
            items,
            last_evaluated_key: self.last_evaluated_key.lock().clone(),
        })
    }

    async fn scan(&self, input: ScanInput) -> Result<ScanOutput, StoreError> {
        self.record(Recorded::Scan(input));
        let items = self.items.lock().clone();
        Ok(ScanOutput {
            count: items.len() as i32,
            items,
            last_evaluated_key: self.last_evaluated_key.lock().clone(),
        })
    }

    async fn update_item(
        &self,
        input: UpdateItemInput,
    ) -> Result<UpdateItemOutput, StoreError> {
        // Simulate ALL_NEW: merge the key with the bound placeholder values.
        let mut attributes: Item = input.key.clone();
        for (placeholder, attribute) in &input.expression_attribute_names {
            let value_placeholder = placeholder.replace("#param", ":val");
            if let Some(value) = input.expression_attribute_values.get(&value_placeholder) {
                attributes.insert(attribute.clone(), value.clone());
            }
        }
        self.record(Recorded::Update(input));
        Ok(UpdateItemOutput { attributes })
    }

    async fn delete_item(&self, input: DeleteItemInput) -> Result<DeleteItemOutput, StoreError> {
        self.record(Recorded::Delete(input));
        Ok(DeleteItemOutput {
            attributes: self.item.lock().clone().unwrap_or_default(),
        })
    }

    async fn batch_get_item(
        &self,
        input: BatchGetItemInput,
    ) -> Result<BatchGetItemOutput, StoreError> {
        let mut responses = HashMap::new();
        for table in input.request_items.keys() {
            responses.insert(table.clone(), self.items.lock().clone());
        }
        self.record(Recorded::Batch(input));
        Ok(BatchGetItemOutput {
            responses,
            unprocessed_keys: HashMap::new(),
        })
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn user_schema() -> ModelSchema {
    ModelSchema {
        name: "user".to_owned(),
        version: "1".to_owned(),
        table_name: "users".to_owned(),
        auto_create: false,
        indexes: vec![
            IndexSpec::hash("id", ScalarAttributeType::S),
            IndexSpec::secondary("authId", ScalarAttributeType::S),
            IndexSpec::composite(vec![
                KeyPart {
                    keytype: KeyKind::Hash,
                    value: "login".to_owned(),
                    attr_type: ScalarAttributeType::S,
                },
                KeyPart {
                    keytype: KeyKind::Range,
                    value: "createdAt".to_owned(),
                    attr_type: ScalarAttributeType::N,
                },
            ]),
        ],
    }
}

fn auto_create_schema() -> ModelSchema {
    ModelSchema {
        auto_create: true,
        ..user_schema()
    }
}

fn user_item() -> Item {
    Item::from([
        ("id".to_owned(), json!("abc123")),
        ("email".to_owned(), json!("ben@ben.com")),
        ("password".to_owned(), json!("secret")),
    ])
}

fn adapter(store: MockStore) -> Adapter<MockStore> {
    Adapter::builder(store).schema(user_schema()).build()
}

// ---------------------------------------------------------------------------
// Table lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_should_create_table_from_model_once() {
    let adapter = adapter(MockStore::default());

    let first = adapter
        .create_table_from_model(None)
        .await
        .unwrap_or_else(|e| panic!("create table failed: {e}"));
    assert!(!first.existed);
    assert_eq!(first.table_name, "users");
    assert_eq!(first.description, None);

    let second = adapter
        .create_table_from_model(None)
        .await
        .unwrap_or_else(|e| panic!("second create failed: {e}"));
    assert!(second.existed);

    let creates = adapter_store_recorded(&adapter)
        .iter()
        .filter(|r| matches!(r, Recorded::CreateTable(_)))
        .count();
    assert_eq!(creates, 1);
}

#[tokio::test]
async fn test_should_send_complete_table_plan() {
    let store = MockStore::default();
    let adapter = adapter(store);
    adapter
        .create_table_from_model(None)
        .await
        .unwrap_or_else(|e| panic!("create table failed: {e}"));

    let recorded = adapter_store_recorded(&adapter);
    let [Recorded::CreateTable(input)] = recorded.as_slice() else {
        panic!("expected exactly one create-table request");
    };
    assert_eq!(input.table_name, "users");
    assert_eq!(input.key_schema.len(), 1);
    // id, authId, login, createdAt
    assert_eq!(input.attribute_definitions.len(), 4);
    let gsis = input
        .global_secondary_indexes
        .as_ref()
        .unwrap_or_else(|| panic!("missing secondary indexes"));
    assert_eq!(gsis.len(), 2);
    assert_eq!(gsis[0].index_name, "authId-index");
    assert_eq!(gsis[1].index_name, "login-createdAt-index");
}

#[tokio::test]
async fn test_should_delete_table_for_resolved_version() {
    let adapter = adapter(MockStore::with_tables(&["users"]));
    adapter
        .delete_table(None)
        .await
        .unwrap_or_else(|e| panic!("delete table failed: {e}"));
    let recorded = adapter_store_recorded(&adapter);
    assert!(matches!(
        recorded.as_slice(),
        [Recorded::DeleteTable(input)] if input.table_name == "users"
    ));
}

// ---------------------------------------------------------------------------
// Auto-create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_should_auto_create_missing_table_once() {
    let adapter = Adapter::builder(MockStore::default())
        .schema(auto_create_schema())
        .build();

    adapter
        .create(user_item(), None)
        .await
        .unwrap_or_else(|e| panic!("create failed: {e}"));
    adapter
        .create(user_item(), None)
        .await
        .unwrap_or_else(|e| panic!("second create failed: {e}"));

    let creates = adapter_store_recorded(&adapter)
        .iter()
        .filter(|r| matches!(r, Recorded::CreateTable(_)))
        .count();
    assert_eq!(creates, 1);
}

#[tokio::test]
async fn test_should_skip_auto_create_when_flag_unset() {
    let adapter = adapter(MockStore::default());
    adapter
        .create(user_item(), None)
        .await
        .unwrap_or_else(|e| panic!("create failed: {e}"));
    assert!(adapter_store_recorded(&adapter)
        .iter()
        .all(|r| matches!(r, Recorded::Put(_))));
}

// ---------------------------------------------------------------------------
// Create / validate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_should_put_item_and_return_it() {
    let adapter = adapter(MockStore::default());
    let created = adapter
        .create(user_item(), None)
        .await
        .unwrap_or_else(|e| panic!("create failed: {e}"));
    assert_eq!(created["email"], json!("ben@ben.com"));

    let recorded = adapter_store_recorded(&adapter);
    let [Recorded::Put(input)] = recorded.as_slice() else {
        panic!("expected exactly one put request");
    };
    assert_eq!(input.table_name, "users");
    assert_eq!(input.return_values, Some(ReturnValue::None));
    assert_eq!(input.item["id"], json!("abc123"));
}

#[tokio::test]
async fn test_should_reject_invalid_item_before_any_store_call() {
    let adapter = Adapter::builder(MockStore::default())
        .schema(user_schema())
        .validator(|item| {
            if item.contains_key("email") {
                Ok(())
            } else {
                Err("email is required".to_owned())
            }
        })
        .build();

    let err = adapter
        .create(Item::from([("id".to_owned(), json!("1"))]), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::Validation { .. }));
    assert!(adapter_store_recorded(&adapter).is_empty());
}

// ---------------------------------------------------------------------------
// Read dispatch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_should_read_by_hash_key_with_get_item() {
    let store = MockStore::default();
    store.set_item(user_item());
    let adapter = adapter(store);

    let result = adapter
        .read(&Key::from([("id".to_owned(), json!("abc123"))]), None)
        .await
        .unwrap_or_else(|e| panic!("read failed: {e}"));
    let ReadResult::Item(Some(item)) = result else {
        panic!("expected a single item");
    };
    assert_eq!(item["id"], json!("abc123"));

    let recorded = adapter_store_recorded(&adapter);
    assert!(matches!(
        recorded.as_slice(),
        [Recorded::Get(input)] if input.key["id"] == json!("abc123")
    ));
}

#[tokio::test]
async fn test_should_read_by_secondary_index_with_query() {
    let store = MockStore::default();
    store.set_items(vec![user_item()]);
    let adapter = adapter(store);

    let result = adapter
        .read(&Key::from([("authId".to_owned(), json!("1234"))]), None)
        .await
        .unwrap_or_else(|e| panic!("read failed: {e}"));
    assert_eq!(result.into_items().len(), 1);

    let recorded = adapter_store_recorded(&adapter);
    let [Recorded::Query(input)] = recorded.as_slice() else {
        panic!("expected exactly one query request");
    };
    assert_eq!(input.index_name.as_deref(), Some("authId-index"));
    assert_eq!(input.key_condition_expression, "authId = :hk_val");
    assert_eq!(input.expression_attribute_values[":hk_val"], json!("1234"));
}

#[tokio::test]
async fn test_should_fail_read_on_unindexed_attribute() {
    let adapter = adapter(MockStore::default());
    let err = adapter
        .read(&Key::from([("email".to_owned(), json!("a@b.com"))]), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ModelError::NoMatchingIndex { ref attribute } if attribute == "email"
    ));
    assert!(adapter_store_recorded(&adapter).is_empty());
}

#[tokio::test]
async fn test_should_apply_sanitizer_to_read_items() {
    let store = MockStore::default();
    store.set_item(user_item());
    let adapter = Adapter::builder(store)
        .schema(user_schema())
        .sanitizer(|mut item| {
            item.remove("password");
            item
        })
        .build();

    let result = adapter
        .read(&Key::from([("id".to_owned(), json!("abc123"))]), None)
        .await
        .unwrap_or_else(|e| panic!("read failed: {e}"));
    let items = result.into_items();
    assert_eq!(items.len(), 1);
    assert!(!items[0].contains_key("password"));
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_should_paginate_index_reads() {
    let store = MockStore::default();
    store.set_items(vec![user_item()]);
    store.set_last_evaluated_key(Key::from([("id".to_owned(), json!("abc123"))]));
    let adapter = adapter(store);

    let key = Key::from([("authId".to_owned(), json!("1234"))]);
    let page = adapter
        .read_paginate(
            &key,
            &ScanOptions {
                limit: Some(25),
                last_key: None,
            },
            None,
        )
        .await
        .unwrap_or_else(|e| panic!("paginate failed: {e}"));
    let token = page.last_key.unwrap_or_else(|| panic!("missing last key"));

    // Feed the token back and confirm the cursor round-trips.
    adapter
        .read_paginate(
            &key,
            &ScanOptions {
                limit: Some(25),
                last_key: Some(token),
            },
            None,
        )
        .await
        .unwrap_or_else(|e| panic!("second page failed: {e}"));

    let recorded = adapter_store_recorded(&adapter);
    let [Recorded::Query(first), Recorded::Query(second)] = recorded.as_slice() else {
        panic!("expected two query requests");
    };
    assert_eq!(first.limit, Some(25));
    assert!(first.exclusive_start_key.is_empty());
    assert_eq!(second.exclusive_start_key["id"], json!("abc123"));
}

#[tokio::test]
async fn test_should_fail_scan_on_malformed_cursor() {
    let adapter = adapter(MockStore::default());
    let err = adapter
        .scan(
            None,
            &ScanOptions {
                limit: None,
                last_key: Some("{not json".to_owned()),
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::BadCursor { .. }));
    assert!(adapter_store_recorded(&adapter).is_empty());
}

// ---------------------------------------------------------------------------
// Scan and filters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_should_scan_with_default_limit_and_no_filter() {
    let store = MockStore::default();
    store.set_items(vec![user_item()]);
    let adapter = adapter(store);

    let page = adapter
        .scan(None, &ScanOptions::default(), None)
        .await
        .unwrap_or_else(|e| panic!("scan failed: {e}"));
    assert_eq!(page.items.len(), 1);
    assert!(page.last_key.is_none());

    let recorded = adapter_store_recorded(&adapter);
    let [Recorded::Scan(input)] = recorded.as_slice() else {
        panic!("expected exactly one scan request");
    };
    assert_eq!(input.limit, Some(1000));
    assert!(input.filter_expression.is_none());
}

#[tokio::test]
async fn test_should_merge_compiled_filter_into_scan() {
    let adapter = adapter(MockStore::default());
    let filter = Filter::new()
        .clause("email", "eq", "ben@ben.com")
        .clause("age", "between", json!([18, 26]));

    adapter
        .scan(Some(&filter), &ScanOptions::default(), None)
        .await
        .unwrap_or_else(|e| panic!("scan failed: {e}"));

    let recorded = adapter_store_recorded(&adapter);
    let [Recorded::Scan(input)] = recorded.as_slice() else {
        panic!("expected exactly one scan request");
    };
    assert_eq!(
        input.filter_expression.as_deref(),
        Some("#attr1 = :val1 and #attr2 between :val2 and :val2_1")
    );
    assert_eq!(input.expression_attribute_names["#attr1"], "email");
    assert_eq!(input.expression_attribute_names["#attr2"], "age");
    assert_eq!(input.expression_attribute_values[":val1"], json!("ben@ben.com"));
    assert_eq!(input.expression_attribute_values[":val2"], json!(18));
    assert_eq!(input.expression_attribute_values[":val2_1"], json!(26));
}

#[tokio::test]
async fn test_should_recover_attribute_operators_from_echoed_scan() {
    let adapter = adapter(MockStore::default());
    let filter = Filter::new()
        .clause("email", "eq", "a@b.com")
        .clause("roles", "contains", "admin");

    adapter
        .scan(Some(&filter), &ScanOptions::default(), None)
        .await
        .unwrap_or_else(|e| panic!("scan failed: {e}"));

    let recorded = adapter_store_recorded(&adapter);
    let [Recorded::Scan(input)] = recorded.as_slice() else {
        panic!("expected exactly one scan request");
    };
    let expression = input
        .filter_expression
        .as_deref()
        .unwrap_or_else(|| panic!("missing filter expression"));

    // Re-derive the attribute-to-operator mapping from the echoed request.
    let mut mapping: Vec<(String, &str)> = Vec::new();
    for clause in expression.split(" and ") {
        let (placeholder, operator) = if let Some(rest) = clause.strip_prefix("contains(") {
            (rest.split(',').next().unwrap_or_default(), "contains")
        } else {
            (clause.split(' ').next().unwrap_or_default(), "eq")
        };
        mapping.push((input.expression_attribute_names[placeholder].clone(), operator));
    }
    assert_eq!(
        mapping,
        vec![("email".to_owned(), "eq"), ("roles".to_owned(), "contains")]
    );
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_should_strip_key_fields_and_set_remaining() {
    let adapter = adapter(MockStore::with_tables(&["users"]));
    let key = Key::from([("id".to_owned(), json!("abc123"))]);
    let patch = Item::from([
        ("id".to_owned(), json!("cannot-change")),
        ("age".to_owned(), json!(31)),
        ("email".to_owned(), json!("new@ben.com")),
    ]);

    let updated = adapter
        .update(&key, patch, None)
        .await
        .unwrap_or_else(|e| panic!("update failed: {e}"));
    assert_eq!(updated["id"], json!("abc123"));
    assert_eq!(updated["age"], json!(31));

    let recorded = adapter_store_recorded(&adapter);
    let [Recorded::Update(input)] = recorded.as_slice() else {
        panic!("expected exactly one update request");
    };
    assert_eq!(
        input.update_expression,
        "SET #param1 = :val1, #param2 = :val2"
    );
    assert_eq!(input.expression_attribute_names["#param1"], "age");
    assert_eq!(input.expression_attribute_names["#param2"], "email");
    assert!(!input
        .expression_attribute_values
        .values()
        .any(|v| *v == json!("cannot-change")));
    assert_eq!(input.return_values, Some(ReturnValue::AllNew));
}

#[tokio::test]
async fn test_should_reject_update_with_only_key_fields() {
    let adapter = adapter(MockStore::with_tables(&["users"]));
    let key = Key::from([("id".to_owned(), json!("abc123"))]);
    let patch = Item::from([("id".to_owned(), json!("abc123"))]);
    let err = adapter.update(&key, patch, None).await.unwrap_err();
    assert!(matches!(err, ModelError::Validation { .. }));
    assert!(adapter_store_recorded(&adapter).is_empty());
}

#[tokio::test]
async fn test_should_delete_by_full_key() {
    let store = MockStore::with_tables(&["users"]);
    store.set_item(user_item());
    let adapter = adapter(store);
    let key = Key::from([
        ("id".to_owned(), json!("abc123")),
        ("createdAt".to_owned(), json!(1700000000)),
    ]);
    let response = adapter
        .delete(&key, None)
        .await
        .unwrap_or_else(|e| panic!("delete failed: {e}"));
    // The store's deletion response is handed back untouched.
    assert_eq!(response["id"], json!("abc123"));
    assert_eq!(response["password"], json!("secret"));

    let recorded = adapter_store_recorded(&adapter);
    let [Recorded::Delete(input)] = recorded.as_slice() else {
        panic!("expected exactly one delete request");
    };
    assert_eq!(input.key.len(), 2);
}

// ---------------------------------------------------------------------------
// Batch reads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_should_fail_empty_batch_before_store_contact() {
    let adapter = adapter(MockStore::default());
    let err = adapter
        .get_items_in_array("id", &[], None)
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::EmptyBatch));
    assert!(adapter_store_recorded(&adapter).is_empty());
}

#[tokio::test]
async fn test_should_batch_get_one_key_per_value() {
    let store = MockStore::default();
    store.set_items(vec![user_item()]);
    let adapter = adapter(store);

    let values: Vec<Value> = vec![json!("a"), json!("b"), json!("c")];
    let items = adapter
        .get_items_in_array("id", &values, None)
        .await
        .unwrap_or_else(|e| panic!("batch get failed: {e}"));
    assert_eq!(items.len(), 1);

    let recorded = adapter_store_recorded(&adapter);
    let [Recorded::Batch(input)] = recorded.as_slice() else {
        panic!("expected exactly one batch request");
    };
    let keys = &input.request_items["users"].keys;
    assert_eq!(keys.len(), 3);
    assert_eq!(keys[0]["id"], json!("a"));
    assert_eq!(keys[2]["id"], json!("c"));
}

// ---------------------------------------------------------------------------
// Versioning
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_should_route_explicit_version_to_its_table() {
    let v2 = ModelSchema {
        version: "2".to_owned(),
        table_name: "users_v2".to_owned(),
        ..user_schema()
    };
    let adapter = Adapter::builder(MockStore::default())
        .schema(user_schema())
        .schema(v2)
        .build();

    // Last registration wins as the default.
    adapter
        .create(user_item(), None)
        .await
        .unwrap_or_else(|e| panic!("default create failed: {e}"));
    adapter
        .create(user_item(), Some("1"))
        .await
        .unwrap_or_else(|e| panic!("versioned create failed: {e}"));

    let recorded = adapter_store_recorded(&adapter);
    let [Recorded::Put(first), Recorded::Put(second)] = recorded.as_slice() else {
        panic!("expected two put requests");
    };
    assert_eq!(first.table_name, "users_v2");
    assert_eq!(second.table_name, "users");
}

#[tokio::test]
async fn test_should_fail_on_unknown_version() {
    let adapter = adapter(MockStore::default());
    let err = adapter.create(user_item(), Some("99")).await.unwrap_err();
    assert!(matches!(
        err,
        ModelError::MissingSchemaVersion { ref version } if version == "99"
    ));
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn adapter_store_recorded(adapter: &Adapter<MockStore>) -> Vec<Recorded> {
    adapter_store(adapter).recorded()
}

fn adapter_store(adapter: &Adapter<MockStore>) -> &MockStore {
    adapter.store()
}
