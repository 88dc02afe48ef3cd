//! Compiles a model schema into the store's table-definition wire format.
//!
//! The generator functions are pure transforms from index declarations to
//! wire records; [`build_table_plan`] walks a schema's declarations in order
//! and assembles one complete [`CreateTableInput`]. Plans are built fresh
//! per call and never cached.

use tracing::debug;

use dynamap_model::input::CreateTableInput;
use dynamap_model::types::{
    AttributeDefinition, GlobalSecondaryIndex, KeySchemaElement, KeyType, Projection,
    ProjectionType, ProvisionedThroughput, ScalarAttributeType,
};

use crate::error::ModelError;
use crate::schema::{CompositeIndex, IndexSpec, KeyKind, ModelSchema, SimpleIndex};

// ---------------------------------------------------------------------------
// Definition generator
// ---------------------------------------------------------------------------

/// Map an attribute name and declared type to a wire attribute definition.
///
/// The type is passed through without validation; an invalid type string
/// surfaces later as a store-side error.
#[must_use]
pub fn attribute_definition(value: &str, attr_type: &ScalarAttributeType) -> AttributeDefinition {
    AttributeDefinition {
        attribute_name: value.to_owned(),
        attribute_type: attr_type.clone(),
    }
}

/// Map an index declaration to a key schema element.
///
/// `KeyType` is `RANGE` iff the declared kind is `range`, and `HASH`
/// otherwise. A `secondary` declaration therefore also yields `HASH`; only
/// call this for `hash`/`range` entries or for the parts of a composite
/// secondary index.
#[must_use]
pub fn key_element(keytype: &KeyKind, value: &str) -> KeySchemaElement {
    KeySchemaElement {
        attribute_name: value.to_owned(),
        key_type: if *keytype == KeyKind::Range {
            KeyType::Range
        } else {
            KeyType::Hash
        },
    }
}

/// Generate a global secondary index record from a `secondary` declaration.
///
/// Simple declarations name the index `{attribute}-index` with a single
/// HASH element. Composite declarations join the part names with `-`
/// (`login-createdAt-index`) and map each part in declared order, so the
/// first part's kind decides HASH and the second's decides RANGE.
#[must_use]
pub fn secondary_index(spec: &IndexSpec) -> GlobalSecondaryIndex {
    let (index_name, key_schema, projection_type, non_key_attributes) = match spec {
        IndexSpec::Simple(SimpleIndex {
            keytype,
            value,
            projection_type,
            non_key_attributes,
            ..
        }) => (
            format!("{value}-index"),
            vec![key_element(keytype, value)],
            projection_type,
            non_key_attributes,
        ),
        IndexSpec::Composite(CompositeIndex {
            values,
            projection_type,
            non_key_attributes,
        }) => {
            let mut name = String::new();
            for part in values {
                name.push_str(&part.value);
                name.push('-');
            }
            name.push_str("index");
            (
                name,
                values
                    .iter()
                    .map(|part| key_element(&part.keytype, &part.value))
                    .collect(),
                projection_type,
                non_key_attributes,
            )
        }
    };

    GlobalSecondaryIndex {
        index_name,
        key_schema,
        projection: projection(projection_type.as_ref(), non_key_attributes),
        provisioned_throughput: ProvisionedThroughput::default(),
    }
}

/// Build the projection record for a secondary index.
///
/// Defaults to `ALL`. The non-key attribute list is only carried for
/// `INCLUDE`; `KEYS_ONLY` and `ALL` drop it.
fn projection(projection_type: Option<&ProjectionType>, non_key_attributes: &[String]) -> Projection {
    let projection_type = projection_type.cloned().unwrap_or_default();
    let non_key_attributes = if projection_type == ProjectionType::Include {
        non_key_attributes.to_vec()
    } else {
        Vec::new()
    };
    Projection {
        projection_type,
        non_key_attributes,
    }
}

// ---------------------------------------------------------------------------
// Table plan builder
// ---------------------------------------------------------------------------

/// Append an attribute definition unless one with the same name exists.
///
/// First occurrence wins; re-inserting the same name is a no-op, so the same
/// attribute may appear in both the primary key and a secondary index.
fn push_unique(definitions: &mut Vec<AttributeDefinition>, definition: AttributeDefinition) {
    if !definitions
        .iter()
        .any(|d| d.attribute_name == definition.attribute_name)
    {
        definitions.push(definition);
    }
}

/// Compile a model schema into a complete table-creation request.
///
/// Walks the declarations in order, partitioning them into the primary key
/// schema and the secondary-index list. Fails fast with
/// [`ModelError::InvalidModel`] on an unrecognized keytype; no partial plan
/// is ever returned. The `GlobalSecondaryIndexes` section is omitted
/// entirely when the schema declares no secondary indexes.
pub fn build_table_plan(schema: &ModelSchema) -> Result<CreateTableInput, ModelError> {
    let mut attribute_definitions: Vec<AttributeDefinition> = Vec::new();
    let mut key_schema: Vec<KeySchemaElement> = Vec::new();
    let mut secondary_indexes: Vec<GlobalSecondaryIndex> = Vec::new();

    for spec in &schema.indexes {
        match spec {
            IndexSpec::Composite(composite) => {
                for part in &composite.values {
                    push_unique(
                        &mut attribute_definitions,
                        attribute_definition(&part.value, &part.attr_type),
                    );
                }
                secondary_indexes.push(secondary_index(spec));
            }
            IndexSpec::Simple(simple) => {
                push_unique(
                    &mut attribute_definitions,
                    attribute_definition(&simple.value, &simple.attr_type),
                );
                match &simple.keytype {
                    KeyKind::Hash | KeyKind::Range => {
                        key_schema.push(key_element(&simple.keytype, &simple.value));
                    }
                    KeyKind::Secondary => secondary_indexes.push(secondary_index(spec)),
                    KeyKind::Unknown(keytype) => {
                        return Err(ModelError::InvalidModel {
                            keytype: keytype.clone(),
                        });
                    }
                }
            }
        }
    }

    debug!(
        table = %schema.table_name,
        attributes = attribute_definitions.len(),
        secondary_indexes = secondary_indexes.len(),
        "built table plan"
    );

    Ok(CreateTableInput {
        table_name: schema.table_name.clone(),
        attribute_definitions,
        key_schema,
        provisioned_throughput: ProvisionedThroughput::default(),
        global_secondary_indexes: (!secondary_indexes.is_empty()).then_some(secondary_indexes),
    })
}
