//! Row declaration types
//!
//! Supported field type tags:
//! - scalars: ascii, bigint, blob, boolean, counter, date, decimal, double,
//!   duration, float, inet, int, smallint, text, time, timestamp, timeuuid,
//!   tinyint, uuid, varchar, varint
//! - collections: list<T>, set<T>, map<K, V>

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::errors::{SchemaError, SchemaResult};

/// Declared type of a field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldType {
    Ascii,
    Bigint,
    Blob,
    Boolean,
    Counter,
    Date,
    Decimal,
    Double,
    Duration,
    Float,
    Inet,
    Int,
    Smallint,
    Text,
    Time,
    Timestamp,
    Timeuuid,
    Tinyint,
    Uuid,
    Varchar,
    Varint,
    /// Ordered collection allowing repeats
    List {
        element_type: Box<FieldType>,
    },
    /// Unordered collection of distinct elements
    Set {
        element_type: Box<FieldType>,
    },
    /// Key/value collection
    Map {
        key_type: Box<FieldType>,
        value_type: Box<FieldType>,
    },
}

impl FieldType {
    /// Returns the bare type tag
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Ascii => "ascii",
            FieldType::Bigint => "bigint",
            FieldType::Blob => "blob",
            FieldType::Boolean => "boolean",
            FieldType::Counter => "counter",
            FieldType::Date => "date",
            FieldType::Decimal => "decimal",
            FieldType::Double => "double",
            FieldType::Duration => "duration",
            FieldType::Float => "float",
            FieldType::Inet => "inet",
            FieldType::Int => "int",
            FieldType::Smallint => "smallint",
            FieldType::Text => "text",
            FieldType::Time => "time",
            FieldType::Timestamp => "timestamp",
            FieldType::Timeuuid => "timeuuid",
            FieldType::Tinyint => "tinyint",
            FieldType::Uuid => "uuid",
            FieldType::Varchar => "varchar",
            FieldType::Varint => "varint",
            FieldType::List { .. } => "list",
            FieldType::Set { .. } => "set",
            FieldType::Map { .. } => "map",
        }
    }

    pub fn list_of(element_type: FieldType) -> Self {
        FieldType::List {
            element_type: Box::new(element_type),
        }
    }

    pub fn set_of(element_type: FieldType) -> Self {
        FieldType::Set {
            element_type: Box::new(element_type),
        }
    }

    pub fn map_of(key_type: FieldType, value_type: FieldType) -> Self {
        FieldType::Map {
            key_type: Box::new(key_type),
            value_type: Box::new(value_type),
        }
    }

    /// Returns true for list, set and map types
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            FieldType::List { .. } | FieldType::Set { .. } | FieldType::Map { .. }
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::List { element_type } => write!(f, "list<{}>", element_type),
            FieldType::Set { element_type } => write!(f, "set<{}>", element_type),
            FieldType::Map {
                key_type,
                value_type,
            } => write!(f, "map<{}, {}>", key_type, value_type),
            scalar => write!(f, "{}", scalar.type_name()),
        }
    }
}

/// Field definition: identifier plus declared type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field identifier
    pub name: String,
    /// Declared type
    #[serde(flatten)]
    pub field_type: FieldType,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Ordered set of field definitions with unique identifiers.
///
/// Iteration follows declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    fields: IndexMap<String, FieldDef>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a field set, failing on the first repeated identifier.
    pub fn try_from_defs(defs: impl IntoIterator<Item = FieldDef>) -> SchemaResult<Self> {
        let mut set = Self::new();
        for def in defs {
            if let Err(rejected) = set.insert(def) {
                return Err(SchemaError::duplicate_field(rejected.name));
            }
        }
        Ok(set)
    }

    /// Adds a field. A repeated identifier is handed back untouched.
    pub fn insert(&mut self, def: FieldDef) -> Result<(), FieldDef> {
        if self.fields.contains_key(&def.name) {
            return Err(def);
        }
        self.fields.insert(def.name.clone(), def);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates definitions in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.values()
    }

    /// Iterates identifiers in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl Serialize for FieldSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.fields.values())
    }
}

/// Partition key as written in a declaration: one identifier or a
/// composite sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PartitionKey {
    Single(String),
    Composite(Vec<String>),
}

impl PartitionKey {
    /// Flattens to an ordered identifier sequence
    pub fn as_slice(&self) -> &[String] {
        match self {
            PartitionKey::Single(id) => std::slice::from_ref(id),
            PartitionKey::Composite(ids) => ids,
        }
    }
}

impl From<&str> for PartitionKey {
    fn from(id: &str) -> Self {
        PartitionKey::Single(id.to_string())
    }
}

impl From<String> for PartitionKey {
    fn from(id: String) -> Self {
        PartitionKey::Single(id)
    }
}

impl From<Vec<String>> for PartitionKey {
    fn from(ids: Vec<String>) -> Self {
        PartitionKey::Composite(ids)
    }
}

impl From<Vec<&str>> for PartitionKey {
    fn from(ids: Vec<&str>) -> Self {
        PartitionKey::Composite(ids.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PartitionKey {
    fn from(ids: [&str; N]) -> Self {
        PartitionKey::Composite(ids.iter().map(|id| id.to_string()).collect())
    }
}

/// Claimed primary key of a row type.
///
/// `partition: None` means no primary key was really given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKeySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<PartitionKey>,
    #[serde(default)]
    pub clustering: Vec<String>,
}

impl PrimaryKeySpec {
    pub fn new(partition: impl Into<PartitionKey>) -> Self {
        Self {
            partition: Some(partition.into()),
            clustering: Vec::new(),
        }
    }

    pub fn with_clustering<I, S>(mut self, clustering: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clustering = clustering.into_iter().map(Into::into).collect();
        self
    }
}

/// Reads an optional primary key where JSON `null` and `false` both mean
/// "not given".
pub(crate) fn primary_key_or_false<'de, D>(deserializer: D) -> Result<Option<PrimaryKeySpec>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    match raw {
        serde_json::Value::Null | serde_json::Value::Bool(false) => Ok(None),
        other => serde_json::from_value(other)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
