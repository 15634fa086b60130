//! Registry of declared row types
//!
//! Built once at initialization, then shared read-only. Descriptors are
//! reachable by row-type name and, for types implementing `RowType`, by
//! Rust type identity. A registered name is never replaced.

use indexmap::IndexMap;
use serde::Deserialize;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use super::descriptor::{RowType, RowTypeDescriptor};
use super::draft::RowTypeDraft;
use super::errors::{SchemaError, SchemaResult};
use super::types::{primary_key_or_false, FieldDef, PrimaryKeySpec};
use crate::observability::{log_event_with_fields, Event};

/// Row declaration as written in JSON:
///
/// ```json
/// {
///   "name": "events",
///   "fields": [{ "name": "bucket", "type": "text" }, { "name": "ts", "type": "timestamp" }],
///   "primary_key": { "partition": "bucket", "clustering": ["ts"] }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RowDeclaration {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default, deserialize_with = "primary_key_or_false")]
    pub primary_key: Option<PrimaryKeySpec>,
}

impl RowDeclaration {
    /// Replays the declaration through a draft
    pub fn into_draft(self) -> RowTypeDraft {
        self.fields
            .into_iter()
            .fold(RowTypeDraft::new(self.name), RowTypeDraft::field_def)
            .primary_key(self.primary_key)
    }
}

/// Registry of validated row types
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    /// Descriptors by row-type name, in registration order
    by_name: IndexMap<String, Arc<RowTypeDescriptor>>,
    /// Descriptors by the Rust type they were declared for
    by_type: HashMap<TypeId, Arc<RowTypeDescriptor>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an already validated descriptor.
    ///
    /// # Errors
    ///
    /// `RowTypeAlreadyRegistered` if the name is taken.
    pub fn register(&mut self, descriptor: RowTypeDescriptor) -> SchemaResult<Arc<RowTypeDescriptor>> {
        if self.by_name.contains_key(descriptor.name()) {
            return Err(SchemaError::already_registered(descriptor.name()));
        }
        let descriptor = Arc::new(descriptor);
        self.by_name
            .insert(descriptor.name().to_string(), Arc::clone(&descriptor));
        log_event_with_fields(Event::RowTypeRegistered, &[("row_type", descriptor.name())]);
        Ok(descriptor)
    }

    /// Declares, validates and registers the row type of `T`.
    pub fn register_type<T: RowType>(&mut self) -> SchemaResult<Arc<RowTypeDescriptor>> {
        let draft = T::declare();
        if self.by_type.contains_key(&TypeId::of::<T>()) {
            return Err(SchemaError::already_registered(draft.name()));
        }
        let descriptor = self.register(draft.finish()?)?;
        self.by_type.insert(TypeId::of::<T>(), Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Declares and registers one row type from a JSON document.
    ///
    /// # Errors
    ///
    /// `MalformedDeclaration` for undecodable JSON, then any declaration or
    /// registration error.
    pub fn declare_json(&mut self, json: &str) -> SchemaResult<Arc<RowTypeDescriptor>> {
        let declaration: RowDeclaration = serde_json::from_str(json)
            .map_err(|e| SchemaError::malformed_declaration(e.to_string()))?;
        self.register(declaration.into_draft().finish()?)
    }

    /// Declares and registers a JSON array of row types.
    ///
    /// All-or-nothing: if any declaration fails, nothing is registered.
    pub fn declare_all_json(&mut self, json: &str) -> SchemaResult<Vec<Arc<RowTypeDescriptor>>> {
        let declarations: Vec<RowDeclaration> = serde_json::from_str(json)
            .map_err(|e| SchemaError::malformed_declaration(e.to_string()))?;

        let mut staged: IndexMap<String, RowTypeDescriptor> = IndexMap::new();
        for declaration in declarations {
            let descriptor = declaration.into_draft().finish()?;
            if self.by_name.contains_key(descriptor.name()) || staged.contains_key(descriptor.name()) {
                return Err(SchemaError::already_registered(descriptor.name()));
            }
            staged.insert(descriptor.name().to_string(), descriptor);
        }

        let count = staged.len().to_string();
        let registered = staged
            .into_values()
            .map(|descriptor| self.register(descriptor))
            .collect::<SchemaResult<Vec<_>>>()?;
        log_event_with_fields(Event::DeclarationsLoaded, &[("count", count.as_str())]);
        Ok(registered)
    }

    pub fn get(&self, name: &str) -> Option<Arc<RowTypeDescriptor>> {
        self.by_name.get(name).cloned()
    }

    /// Looks up the descriptor registered for `T`
    pub fn descriptor_of<T: RowType>(&self) -> Option<Arc<RowTypeDescriptor>> {
        self.by_type.get(&TypeId::of::<T>()).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Iterates descriptors in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<RowTypeDescriptor>> {
        self.by_name.values()
    }
}
