//! Primary-key validation for row declarations
//!
//! Checks run in a fixed order so the same bad declaration always yields
//! the same error:
//! 1. primary key present
//! 2. every partition key declared (first offender reported)
//! 3. partition key non-empty
//! 4. every clustering key declared (first offender reported)
//! 5. clustering keys disjoint from partition keys
//!
//! Field uniqueness and non-emptiness are the declaration mechanism's job
//! (see `RowTypeDraft`) and are not re-checked here.

use std::collections::HashSet;

use super::descriptor::RowTypeDescriptor;
use super::errors::{SchemaError, SchemaResult};
use super::types::{FieldSet, PrimaryKeySpec};

/// Turns a field set plus a claimed primary key into a descriptor.
///
/// Stateless; every call is independent.
pub struct SchemaValidator;

impl SchemaValidator {
    /// Validates a declaration and builds the immutable descriptor.
    ///
    /// # Errors
    ///
    /// - `MissingPrimaryKey` if `primary_key` or its partition is absent
    /// - `UnknownPartitionKey` for the first undeclared (or repeated)
    ///   partition key
    /// - `EmptyPartitionKey` if the partition key names no fields
    /// - `UnknownClusteringKey` for the first undeclared clustering key,
    ///   then for the first clustering key already used as a key
    pub fn validate(
        name: &str,
        fields: FieldSet,
        primary_key: Option<&PrimaryKeySpec>,
    ) -> SchemaResult<RowTypeDescriptor> {
        Self::check(&fields, primary_key)
            .map_err(|e| e.for_row_type(name))
            .map(|(partition_keys, clustering_keys)| {
                RowTypeDescriptor::new(name.to_string(), fields, partition_keys, clustering_keys)
            })
    }

    fn check(
        fields: &FieldSet,
        primary_key: Option<&PrimaryKeySpec>,
    ) -> SchemaResult<(Vec<String>, Vec<String>)> {
        let spec = primary_key.ok_or_else(SchemaError::missing_primary_key)?;
        let partition = spec
            .partition
            .as_ref()
            .ok_or_else(SchemaError::missing_primary_key)?;

        let mut partition_keys: Vec<String> = Vec::new();
        for id in partition.as_slice() {
            if !fields.contains(id) {
                return Err(SchemaError::unknown_partition_key(id));
            }
            if partition_keys.contains(id) {
                return Err(SchemaError::repeated_partition_key(id));
            }
            partition_keys.push(id.clone());
        }

        if partition_keys.is_empty() {
            return Err(SchemaError::empty_partition_key());
        }

        if let Some(unknown) = spec.clustering.iter().find(|id| !fields.contains(id)) {
            return Err(SchemaError::unknown_clustering_key(unknown));
        }

        let mut taken: HashSet<&str> = partition_keys.iter().map(String::as_str).collect();
        for id in &spec.clustering {
            if !taken.insert(id.as_str()) {
                return Err(SchemaError::overlapping_clustering_key(id));
            }
        }

        Ok((partition_keys, spec.clustering.clone()))
    }
}
