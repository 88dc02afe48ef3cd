//! Shared wire types for table definitions and item operations.
//!
//! Structs use `#[serde(rename_all = "PascalCase")]` to match the store's
//! JSON wire format. Enum variants use idiomatic Rust `PascalCase` naming
//! with `#[serde(rename)]` attributes mapping to the store's
//! `SCREAMING_SNAKE_CASE` strings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Type aliases for common item shapes
// ---------------------------------------------------------------------------

/// An item: a map of attribute names to JSON values.
pub type Item = HashMap<String, Value>;

/// A key: a map of key attribute names to JSON values.
pub type Key = HashMap<String, Value>;

/// Expression attribute names mapping (`#name` placeholders to attribute names).
pub type ExpressionAttributeNames = HashMap<String, String>;

/// Expression attribute values mapping (`:value` placeholders to JSON values).
pub type ExpressionAttributeValues = HashMap<String, Value>;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Key type within a key schema element.
///
/// `Hash` denotes the partition key; `Range` denotes the sort key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// Partition key.
    #[serde(rename = "HASH")]
    Hash,
    /// Sort key.
    #[serde(rename = "RANGE")]
    Range,
}

impl KeyType {
    /// Returns the wire-format string representation of this key type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hash => "HASH",
            Self::Range => "RANGE",
        }
    }
}

impl std::fmt::Display for KeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar attribute type for key schema and attribute definitions.
///
/// Only `S`, `N`, and `B` are valid key attribute types, but a model may
/// declare any string; invalid values are carried through unchanged and
/// surface as a store-side error rather than being rejected here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarAttributeType {
    /// String type.
    S,
    /// Number type.
    N,
    /// Binary type.
    B,
    /// An unrecognized attribute type, passed through verbatim.
    Unknown(String),
}

impl ScalarAttributeType {
    /// Returns the wire-format string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::S => "S",
            Self::N => "N",
            Self::B => "B",
            Self::Unknown(s) => s.as_str(),
        }
    }

    /// Returns `true` if this is a valid key attribute type (S, N, or B).
    #[must_use]
    pub fn is_valid_key_type(&self) -> bool {
        matches!(self, Self::S | Self::N | Self::B)
    }
}

impl From<&str> for ScalarAttributeType {
    fn from(s: &str) -> Self {
        match s {
            "S" => Self::S,
            "N" => Self::N,
            "B" => Self::B,
            _ => Self::Unknown(s.to_owned()),
        }
    }
}

impl Serialize for ScalarAttributeType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ScalarAttributeType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

impl std::fmt::Display for ScalarAttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Projection type for secondary indexes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProjectionType {
    /// All attributes from the table are projected into the index.
    #[default]
    #[serde(rename = "ALL")]
    All,
    /// Only the index and primary keys are projected.
    #[serde(rename = "KEYS_ONLY")]
    KeysOnly,
    /// Only specified non-key attributes are projected alongside keys.
    #[serde(rename = "INCLUDE")]
    Include,
}

impl ProjectionType {
    /// Returns the wire-format string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::KeysOnly => "KEYS_ONLY",
            Self::Include => "INCLUDE",
        }
    }
}

impl std::fmt::Display for ProjectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Determines what values are returned by write operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReturnValue {
    /// Nothing is returned.
    #[default]
    #[serde(rename = "NONE")]
    None,
    /// Returns all attributes of the item as they appeared before the operation.
    #[serde(rename = "ALL_OLD")]
    AllOld,
    /// Returns all attributes of the item as they appear after the operation.
    #[serde(rename = "ALL_NEW")]
    AllNew,
}

impl ReturnValue {
    /// Returns the wire-format string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::AllOld => "ALL_OLD",
            Self::AllNew => "ALL_NEW",
        }
    }
}

impl std::fmt::Display for ReturnValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Structs - Key Schema & Attributes
// ---------------------------------------------------------------------------

/// An element of the key schema for a table or index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeySchemaElement {
    /// The name of the key attribute.
    pub attribute_name: String,
    /// The role of the attribute in the key schema (`HASH` or `RANGE`).
    pub key_type: KeyType,
}

/// An attribute definition specifying the attribute name and its scalar type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeDefinition {
    /// The name of the attribute.
    pub attribute_name: String,
    /// The scalar data type of the attribute.
    pub attribute_type: ScalarAttributeType,
}

// ---------------------------------------------------------------------------
// Structs - Throughput & Projection
// ---------------------------------------------------------------------------

/// Provisioned throughput settings for a table or secondary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisionedThroughput {
    /// The maximum number of strongly consistent reads per second.
    pub read_capacity_units: i64,
    /// The maximum number of writes per second.
    pub write_capacity_units: i64,
}

impl Default for ProvisionedThroughput {
    fn default() -> Self {
        Self {
            read_capacity_units: 1,
            write_capacity_units: 1,
        }
    }
}

/// Projection settings for a secondary index.
///
/// Controls which attributes are copied from the base table into the index.
/// `non_key_attributes` is only serialized for the `INCLUDE` projection type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Projection {
    /// The set of attributes projected into the index.
    pub projection_type: ProjectionType,
    /// The non-key attributes to project when `projection_type` is `INCLUDE`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_key_attributes: Vec<String>,
}

// ---------------------------------------------------------------------------
// Structs - Secondary Indexes
// ---------------------------------------------------------------------------

/// Global secondary index definition for a table-creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GlobalSecondaryIndex {
    /// The name of the global secondary index.
    pub index_name: String,
    /// The key schema for this index (partition key, optional sort key).
    pub key_schema: Vec<KeySchemaElement>,
    /// The attributes projected into this index.
    pub projection: Projection,
    /// The provisioned throughput for this index.
    pub provisioned_throughput: ProvisionedThroughput,
}

// ---------------------------------------------------------------------------
// Structs - Table Description
// ---------------------------------------------------------------------------

/// Description of a table as returned by the store's table operations.
///
/// Only the fields this layer consumes are modeled; the store may return
/// more, and unknown fields are ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableDescription {
    /// The name of the table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    /// The current status of the table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_status: Option<String>,
    /// The key schema for the table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_schema: Vec<KeySchemaElement>,
    /// The attribute definitions for the table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attribute_definitions: Vec<AttributeDefinition>,
    /// The number of items in the table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<i64>,
}

// ---------------------------------------------------------------------------
// Structs - Batch Operations
// ---------------------------------------------------------------------------

/// A set of keys to retrieve from one table in a batch-get request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeysAndAttributes {
    /// The primary keys of the items to retrieve.
    pub keys: Vec<Key>,
    /// If `true`, a strongly consistent read is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistent_read: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_serialize_key_schema_element() {
        let elem = KeySchemaElement {
            attribute_name: "id".to_owned(),
            key_type: KeyType::Hash,
        };
        let json = serde_json::to_string(&elem).expect("serialize KeySchemaElement");
        assert_eq!(json, r#"{"AttributeName":"id","KeyType":"HASH"}"#);
    }

    #[test]
    fn test_should_roundtrip_attribute_definition() {
        let def = AttributeDefinition {
            attribute_name: "login".to_owned(),
            attribute_type: ScalarAttributeType::S,
        };
        let json = serde_json::to_string(&def).expect("serialize AttributeDefinition");
        let parsed: AttributeDefinition =
            serde_json::from_str(&json).expect("deserialize AttributeDefinition");
        assert_eq!(def, parsed);
    }

    #[test]
    fn test_should_pass_unknown_attribute_type_through() {
        let ty = ScalarAttributeType::from("JUNK");
        assert_eq!(ty, ScalarAttributeType::Unknown("JUNK".to_owned()));
        assert!(!ty.is_valid_key_type());
        let json = serde_json::to_string(&ty).expect("serialize ScalarAttributeType");
        assert_eq!(json, r#""JUNK""#);
    }

    #[test]
    fn test_should_default_projection_to_all() {
        let proj = Projection::default();
        let json = serde_json::to_string(&proj).expect("serialize Projection");
        assert_eq!(json, r#"{"ProjectionType":"ALL"}"#);
    }

    #[test]
    fn test_should_serialize_include_projection_with_attributes() {
        let proj = Projection {
            projection_type: ProjectionType::Include,
            non_key_attributes: vec!["email".to_owned(), "firstName".to_owned()],
        };
        let json = serde_json::to_string(&proj).expect("serialize Projection");
        assert!(json.contains(r#""ProjectionType":"INCLUDE""#));
        assert!(json.contains(r#""NonKeyAttributes":["email","firstName"]"#));
    }

    #[test]
    fn test_should_default_provisioned_throughput_to_one() {
        let pt = ProvisionedThroughput::default();
        let json = serde_json::to_string(&pt).expect("serialize ProvisionedThroughput");
        assert_eq!(json, r#"{"ReadCapacityUnits":1,"WriteCapacityUnits":1}"#);
    }

    #[test]
    fn test_should_roundtrip_global_secondary_index() {
        let gsi = GlobalSecondaryIndex {
            index_name: "authId-index".to_owned(),
            key_schema: vec![KeySchemaElement {
                attribute_name: "authId".to_owned(),
                key_type: KeyType::Hash,
            }],
            projection: Projection::default(),
            provisioned_throughput: ProvisionedThroughput::default(),
        };
        let json = serde_json::to_string(&gsi).expect("serialize GlobalSecondaryIndex");
        let parsed: GlobalSecondaryIndex =
            serde_json::from_str(&json).expect("deserialize GlobalSecondaryIndex");
        assert_eq!(gsi, parsed);
    }

    #[test]
    fn test_should_skip_empty_fields_in_table_description() {
        let desc = TableDescription {
            table_name: Some("tmpusers".to_owned()),
            ..Default::default()
        };
        let json = serde_json::to_string(&desc).expect("serialize TableDescription");
        assert_eq!(json, r#"{"TableName":"tmpusers"}"#);
    }
}
