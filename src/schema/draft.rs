//! Row declaration mechanism
//!
//! A `RowTypeDraft` collects fields and the claimed primary key, then
//! `finish` turns it into a `RowTypeDescriptor` or a `SchemaError`. The
//! draft owns field-level rules (unique, non-empty); key rules belong to
//! `SchemaValidator`.

use super::descriptor::RowTypeDescriptor;
use super::errors::{SchemaError, SchemaResult};
use super::types::{FieldDef, FieldSet, FieldType, PartitionKey, PrimaryKeySpec};
use super::validator::SchemaValidator;
use crate::observability::{log_event_with_fields, Event};

/// In-progress row declaration
#[derive(Debug, Clone)]
pub struct RowTypeDraft {
    name: String,
    fields: FieldSet,
    /// First field name declared twice, reported by `finish`
    duplicate: Option<String>,
    primary_key: Option<PrimaryKeySpec>,
}

impl RowTypeDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: FieldSet::new(),
            duplicate: None,
            primary_key: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declares a field
    pub fn field(self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.field_def(FieldDef::new(name, field_type))
    }

    /// Declares a field from a ready-made definition
    pub fn field_def(mut self, def: FieldDef) -> Self {
        if let Err(rejected) = self.fields.insert(def) {
            if self.duplicate.is_none() {
                self.duplicate = Some(rejected.name);
            }
        }
        self
    }

    /// Sets the partition key, keeping any clustering keys already given
    pub fn partition_key(mut self, partition: impl Into<PartitionKey>) -> Self {
        let spec = self.primary_key.get_or_insert_with(PrimaryKeySpec::default);
        spec.partition = Some(partition.into());
        self
    }

    /// Sets the clustering keys, keeping any partition key already given
    pub fn clustering_keys<I, S>(mut self, clustering: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = self.primary_key.get_or_insert_with(PrimaryKeySpec::default);
        spec.clustering = clustering.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the whole primary key claim
    pub fn primary_key(mut self, spec: Option<PrimaryKeySpec>) -> Self {
        self.primary_key = spec;
        self
    }

    /// Completes the declaration.
    ///
    /// # Errors
    ///
    /// `DuplicateField` or `EmptyRowType` for field-level problems, otherwise
    /// whatever `SchemaValidator::validate` reports.
    pub fn finish(self) -> SchemaResult<RowTypeDescriptor> {
        let name = self.name.clone();
        let result = self.build();
        match &result {
            Ok(descriptor) => {
                let pk = descriptor.primary_key().join(",");
                log_event_with_fields(
                    Event::RowTypeDeclared,
                    &[("row_type", name.as_str()), ("primary_key", pk.as_str())],
                );
            }
            Err(err) => {
                log_event_with_fields(
                    Event::RowTypeRejected,
                    &[("row_type", name.as_str()), ("code", err.code().code())],
                );
            }
        }
        result
    }

    fn build(self) -> SchemaResult<RowTypeDescriptor> {
        if let Some(field) = self.duplicate {
            return Err(SchemaError::duplicate_field(field).for_row_type(self.name));
        }
        if self.fields.is_empty() {
            return Err(SchemaError::empty_row_type().for_row_type(self.name));
        }
        SchemaValidator::validate(&self.name, self.fields, self.primary_key.as_ref())
    }
}
