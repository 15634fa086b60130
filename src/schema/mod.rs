//! Row-type declaration and primary-key validation
//!
//! # Design Principles
//!
//! - A row type is usable only after its primary key validates
//! - Partition key is mandatory and non-empty
//! - Every key names a declared field; no field serves two key roles
//! - Validation order is fixed so errors are reproducible
//! - Descriptors are immutable and shared read-only (`Arc`)

mod descriptor;
mod draft;
mod errors;
mod registry;
mod types;
mod validator;

pub use descriptor::{KeyRole, Row, RowType, RowTypeDescriptor};
pub use draft::RowTypeDraft;
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use registry::{RowDeclaration, SchemaRegistry};
pub use types::{FieldDef, FieldSet, FieldType, PartitionKey, PrimaryKeySpec};
pub use validator::SchemaValidator;
