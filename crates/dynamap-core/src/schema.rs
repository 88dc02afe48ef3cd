//! Versioned model schemas and the schema registry.
//!
//! A [`ModelSchema`] declares the table name, index layout, and auto-create
//! behavior for one version of a model. The [`SchemaRegistry`] holds every
//! registered version plus a default-version pointer; it is populated once
//! at startup and read-only afterwards.
//!
//! Schemas serialize with the original `camelCase` declaration format
//! (`keytype`, `tableName`, `projectionType`, ...) so existing JSON model
//! declarations load unchanged.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use dynamap_model::types::{ProjectionType, ScalarAttributeType};

use crate::error::ModelError;

// ---------------------------------------------------------------------------
// Key kinds
// ---------------------------------------------------------------------------

/// The role an index declaration plays in the table layout.
///
/// Declared as a closed enum rather than a raw string so the invalid-model
/// case is explicit: an unrecognized keytype deserializes into
/// [`KeyKind::Unknown`] and fails table-plan construction instead of
/// silently falling through to a default branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// Primary partition key. Exactly one per schema.
    Hash,
    /// Primary sort key. At most one per schema.
    Range,
    /// A global secondary index over one attribute.
    Secondary,
    /// An unrecognized keytype string. Invalid-model condition.
    Unknown(String),
}

impl KeyKind {
    /// Returns the declaration-format string for this kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Hash => "hash",
            Self::Range => "range",
            Self::Secondary => "secondary",
            Self::Unknown(s) => s.as_str(),
        }
    }
}

impl From<&str> for KeyKind {
    fn from(s: &str) -> Self {
        match s {
            "hash" => Self::Hash,
            "range" => Self::Range,
            "secondary" => Self::Secondary,
            _ => Self::Unknown(s.to_owned()),
        }
    }
}

impl Serialize for KeyKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for KeyKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

impl std::fmt::Display for KeyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Index declarations
// ---------------------------------------------------------------------------

/// One attribute participating in a composite secondary index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPart {
    /// Whether this part is the index's partition (`hash`) or sort (`range`) key.
    pub keytype: KeyKind,
    /// The attribute name.
    pub value: String,
    /// The attribute's scalar type.
    #[serde(rename = "type")]
    pub attr_type: ScalarAttributeType,
}

/// An index over a single attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleIndex {
    /// The role of this declaration: `hash`, `range`, or `secondary`.
    pub keytype: KeyKind,
    /// The attribute name.
    pub value: String,
    /// The attribute's scalar type.
    #[serde(rename = "type")]
    pub attr_type: ScalarAttributeType,
    /// Optional projection override for secondary indexes (default `ALL`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection_type: Option<ProjectionType>,
    /// Attribute allow-list, only meaningful for `INCLUDE` projections.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_key_attributes: Vec<String>,
}

/// A secondary index over multiple attributes (its own hash and range key).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeIndex {
    /// The underlying attributes, in declared order. The first entry's
    /// keytype determines the index HASH key, the second's the RANGE key.
    pub values: Vec<KeyPart>,
    /// Optional projection override (default `ALL`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection_type: Option<ProjectionType>,
    /// Attribute allow-list, only meaningful for `INCLUDE` projections.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_key_attributes: Vec<String>,
}

/// One index declaration in a model schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexSpec {
    /// A secondary index over multiple attributes.
    Composite(CompositeIndex),
    /// An index over a single attribute.
    Simple(SimpleIndex),
}

impl IndexSpec {
    /// Declare the primary hash key.
    #[must_use]
    pub fn hash(value: impl Into<String>, attr_type: ScalarAttributeType) -> Self {
        Self::simple(KeyKind::Hash, value, attr_type)
    }

    /// Declare the primary range key.
    #[must_use]
    pub fn range(value: impl Into<String>, attr_type: ScalarAttributeType) -> Self {
        Self::simple(KeyKind::Range, value, attr_type)
    }

    /// Declare a secondary index over one attribute.
    #[must_use]
    pub fn secondary(value: impl Into<String>, attr_type: ScalarAttributeType) -> Self {
        Self::simple(KeyKind::Secondary, value, attr_type)
    }

    /// Declare an index with an explicit key kind.
    #[must_use]
    pub fn simple(
        keytype: KeyKind,
        value: impl Into<String>,
        attr_type: ScalarAttributeType,
    ) -> Self {
        Self::Simple(SimpleIndex {
            keytype,
            value: value.into(),
            attr_type,
            projection_type: None,
            non_key_attributes: Vec::new(),
        })
    }

    /// Declare a composite secondary index over the given parts.
    #[must_use]
    pub fn composite(values: Vec<KeyPart>) -> Self {
        Self::Composite(CompositeIndex {
            values,
            projection_type: None,
            non_key_attributes: Vec::new(),
        })
    }

    /// Set the projection type for a secondary index declaration.
    #[must_use]
    pub fn with_projection(mut self, projection_type: ProjectionType) -> Self {
        match &mut self {
            Self::Simple(s) => s.projection_type = Some(projection_type),
            Self::Composite(c) => c.projection_type = Some(projection_type),
        }
        self
    }

    /// Set the non-key attribute allow-list for an `INCLUDE` projection.
    #[must_use]
    pub fn with_non_key_attributes(mut self, attrs: Vec<String>) -> Self {
        match &mut self {
            Self::Simple(s) => s.non_key_attributes = attrs,
            Self::Composite(c) => c.non_key_attributes = attrs,
        }
        self
    }

    /// The attribute name this declaration covers, for index lookup.
    ///
    /// Composite declarations match no single attribute and return `None`;
    /// reads keyed on part of a composite index are not resolvable.
    #[must_use]
    pub fn covers(&self) -> Option<(&str, &KeyKind)> {
        match self {
            Self::Simple(s) => Some((s.value.as_str(), &s.keytype)),
            Self::Composite(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Model schema
// ---------------------------------------------------------------------------

/// One version of a model: table name, index layout, auto-create flag.
///
/// Immutable once registered under a version key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSchema {
    /// The model name.
    pub name: String,
    /// The version identifier this schema was declared as.
    pub version: String,
    /// The backing table name.
    pub table_name: String,
    /// Whether facade writes ensure the table exists before the first put.
    #[serde(default)]
    pub auto_create: bool,
    /// The ordered index declarations.
    pub indexes: Vec<IndexSpec>,
}

impl ModelSchema {
    /// Find the index declaration covering the given attribute name.
    #[must_use]
    pub fn index_for(&self, attribute: &str) -> Option<&KeyKind> {
        self.indexes.iter().find_map(|spec| match spec.covers() {
            Some((value, kind)) if value == attribute => Some(kind),
            _ => None,
        })
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Holds every registered schema version plus the default-version pointer.
///
/// Populated once at startup (registration order matters: the most recently
/// registered version becomes the default) and read concurrently afterwards
/// with no writer.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, ModelSchema>,
    default_version: Option<String>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema under a version key and make it the default.
    pub fn register(&mut self, version: impl Into<String>, schema: ModelSchema) {
        let version = version.into();
        self.default_version = Some(version.clone());
        self.schemas.insert(version, schema);
    }

    /// The current default version, if any schema has been registered.
    #[must_use]
    pub fn default_version(&self) -> Option<&str> {
        self.default_version.as_deref()
    }

    /// Resolve an optional version override to a schema.
    ///
    /// `None` resolves to the default version. Resolution happens once at
    /// the entry point of each operation.
    pub fn resolve(&self, version: Option<&str>) -> Result<&ModelSchema, ModelError> {
        let version = version.or(self.default_version.as_deref()).unwrap_or("");
        self.schemas
            .get(version)
            .ok_or_else(|| ModelError::MissingSchemaVersion {
                version: version.to_owned(),
            })
    }

    /// All registered versions and schemas.
    #[must_use]
    pub fn schemas(&self) -> &HashMap<String, ModelSchema> {
        &self.schemas
    }
}
