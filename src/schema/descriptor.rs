//! Validated row-type descriptors and record parsing

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::draft::RowTypeDraft;
use super::errors::{SchemaError, SchemaResult};
use super::types::{FieldDef, FieldSet};

/// Role a field plays in the primary key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    Partition,
    Clustering,
}

/// Immutable result of a successful row declaration.
///
/// Only `SchemaValidator` builds these, so every descriptor in circulation
/// has a non-empty partition key, keys that name declared fields, and
/// disjoint partition and clustering keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowTypeDescriptor {
    name: String,
    fields: FieldSet,
    partition_keys: Vec<String>,
    clustering_keys: Vec<String>,
    primary_key: Vec<String>,
}

impl RowTypeDescriptor {
    pub(super) fn new(
        name: String,
        fields: FieldSet,
        partition_keys: Vec<String>,
        clustering_keys: Vec<String>,
    ) -> Self {
        let primary_key = partition_keys
            .iter()
            .chain(clustering_keys.iter())
            .cloned()
            .collect();
        Self {
            name,
            fields,
            partition_keys,
            clustering_keys,
            primary_key,
        }
    }

    /// Row type name, also the default query source
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains(name)
    }

    pub fn partition_keys(&self) -> &[String] {
        &self.partition_keys
    }

    pub fn clustering_keys(&self) -> &[String] {
        &self.clustering_keys
    }

    /// Partition keys followed by clustering keys, in declared order
    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    pub fn key_role(&self, name: &str) -> Option<KeyRole> {
        if self.partition_keys.iter().any(|k| k == name) {
            Some(KeyRole::Partition)
        } else if self.clustering_keys.iter().any(|k| k == name) {
            Some(KeyRole::Clustering)
        } else {
            None
        }
    }

    /// Maps a raw record onto this row type.
    ///
    /// Keys that are not declared fields are dropped. Declared fields missing
    /// from the record are simply absent from the row. `None` in, `None` out.
    pub fn parse(&self, record: Option<&Map<String, Value>>) -> Option<Row> {
        let record = record?;
        let values = self
            .fields
            .names()
            .filter_map(|name| record.get(name).map(|v| (name.to_string(), v.clone())))
            .collect();
        Some(Row { values })
    }

    /// Maps a raw record onto this row type and decodes it into `T`.
    ///
    /// # Errors
    ///
    /// `MalformedRecord` if the mapped fields do not deserialize into `T`.
    pub fn parse_as<T: DeserializeOwned>(
        &self,
        record: Option<&Map<String, Value>>,
    ) -> SchemaResult<Option<T>> {
        let Some(row) = self.parse(record) else {
            return Ok(None);
        };
        serde_json::from_value(row.into_value())
            .map(Some)
            .map_err(|e| SchemaError::malformed_record(&self.name, e.to_string()))
    }
}

/// A record restricted to the declared fields of a row type, in
/// declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row {
    values: IndexMap<String, Value>,
}

impl Row {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Converts into a JSON object
    pub fn into_value(self) -> Value {
        Value::Object(self.values.into_iter().collect())
    }
}

/// A Rust type with a row declaration attached.
///
/// ```ignore
/// impl RowType for Event {
///     fn declare() -> RowTypeDraft {
///         RowTypeDraft::new("events")
///             .field("bucket", FieldType::Text)
///             .field("ts", FieldType::Timestamp)
///             .partition_key("bucket")
///             .clustering_keys(["ts"])
///     }
/// }
/// ```
pub trait RowType: DeserializeOwned + 'static {
    fn declare() -> RowTypeDraft;
}
