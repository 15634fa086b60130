//! Schema error types
//!
//! Error codes:
//! - WIDEROW_MISSING_PRIMARY_KEY (FATAL)
//! - WIDEROW_EMPTY_PARTITION_KEY (FATAL)
//! - WIDEROW_UNKNOWN_PARTITION_KEY (FATAL)
//! - WIDEROW_UNKNOWN_CLUSTERING_KEY (FATAL)
//! - WIDEROW_DUPLICATE_FIELD (FATAL)
//! - WIDEROW_EMPTY_ROW_TYPE (FATAL)
//! - WIDEROW_MALFORMED_DECLARATION (FATAL)
//! - WIDEROW_ROW_TYPE_ALREADY_REGISTERED (REJECT)
//! - WIDEROW_MALFORMED_RECORD (REJECT)

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The offending call is rejected, already-declared row types stay usable
    Reject,
    /// The row type cannot be used at all
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// No primary key supplied at all
    MissingPrimaryKey,
    /// Primary key resolves to zero partition-key identifiers
    EmptyPartitionKey,
    /// Partition key references an undeclared field
    UnknownPartitionKey,
    /// Clustering key references an undeclared field, or a field already
    /// serving another key role
    UnknownClusteringKey,
    /// Same field name declared twice
    DuplicateField,
    /// Row type declared without any fields
    EmptyRowType,
    /// Declaration document could not be decoded
    MalformedDeclaration,
    /// Row type name already taken in a registry
    RowTypeAlreadyRegistered,
    /// Record could not be decoded into the requested row struct
    MalformedRecord,
}

impl SchemaErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::MissingPrimaryKey => "WIDEROW_MISSING_PRIMARY_KEY",
            SchemaErrorCode::EmptyPartitionKey => "WIDEROW_EMPTY_PARTITION_KEY",
            SchemaErrorCode::UnknownPartitionKey => "WIDEROW_UNKNOWN_PARTITION_KEY",
            SchemaErrorCode::UnknownClusteringKey => "WIDEROW_UNKNOWN_CLUSTERING_KEY",
            SchemaErrorCode::DuplicateField => "WIDEROW_DUPLICATE_FIELD",
            SchemaErrorCode::EmptyRowType => "WIDEROW_EMPTY_ROW_TYPE",
            SchemaErrorCode::MalformedDeclaration => "WIDEROW_MALFORMED_DECLARATION",
            SchemaErrorCode::RowTypeAlreadyRegistered => "WIDEROW_ROW_TYPE_ALREADY_REGISTERED",
            SchemaErrorCode::MalformedRecord => "WIDEROW_MALFORMED_RECORD",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::RowTypeAlreadyRegistered | SchemaErrorCode::MalformedRecord => {
                Severity::Reject
            }
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    /// Error code
    code: SchemaErrorCode,
    /// Human-readable message
    message: String,
    /// Row type name if applicable
    row_type: Option<String>,
    /// Offending field or key identifier if applicable
    identifier: Option<String>,
}

impl SchemaError {
    fn new(code: SchemaErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            row_type: None,
            identifier: None,
        }
    }

    fn with_identifier(mut self, identifier: String) -> Self {
        self.identifier = Some(identifier);
        self
    }

    /// Attaches the row type the error was raised for
    pub fn for_row_type(mut self, row_type: impl Into<String>) -> Self {
        self.row_type = Some(row_type.into());
        self
    }

    /// Create a missing primary key error
    pub fn missing_primary_key() -> Self {
        Self::new(
            SchemaErrorCode::MissingPrimaryKey,
            "A primary key with a partition key is required".into(),
        )
    }

    /// Create an empty partition key error
    pub fn empty_partition_key() -> Self {
        Self::new(
            SchemaErrorCode::EmptyPartitionKey,
            "Partition key must name at least one field".into(),
        )
    }

    /// Create an unknown partition key error
    pub fn unknown_partition_key(identifier: impl Into<String>) -> Self {
        let id = identifier.into();
        Self::new(
            SchemaErrorCode::UnknownPartitionKey,
            format!("Partition key '{}' is not a declared field", id),
        )
        .with_identifier(id)
    }

    /// Create an error for a partition key listed more than once
    pub fn repeated_partition_key(identifier: impl Into<String>) -> Self {
        let id = identifier.into();
        Self::new(
            SchemaErrorCode::UnknownPartitionKey,
            format!("Partition key '{}' is listed more than once", id),
        )
        .with_identifier(id)
    }

    /// Create an unknown clustering key error
    pub fn unknown_clustering_key(identifier: impl Into<String>) -> Self {
        let id = identifier.into();
        Self::new(
            SchemaErrorCode::UnknownClusteringKey,
            format!("Clustering key '{}' is not a declared field", id),
        )
        .with_identifier(id)
    }

    /// Create an error for a clustering key that already serves as a
    /// partition key or is listed twice
    pub fn overlapping_clustering_key(identifier: impl Into<String>) -> Self {
        let id = identifier.into();
        Self::new(
            SchemaErrorCode::UnknownClusteringKey,
            format!("Clustering key '{}' already serves another key role", id),
        )
        .with_identifier(id)
    }

    /// Create a duplicate field error
    pub fn duplicate_field(field: impl Into<String>) -> Self {
        let f = field.into();
        Self::new(
            SchemaErrorCode::DuplicateField,
            format!("Field '{}' is declared more than once", f),
        )
        .with_identifier(f)
    }

    /// Create an empty row type error
    pub fn empty_row_type() -> Self {
        Self::new(
            SchemaErrorCode::EmptyRowType,
            "Row type must declare at least one field".into(),
        )
    }

    /// Create an error for an undecodable declaration document
    pub fn malformed_declaration(reason: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::MalformedDeclaration,
            format!("Malformed row declaration: {}", reason.into()),
        )
    }

    /// Create a duplicate registration error
    pub fn already_registered(row_type: impl Into<String>) -> Self {
        let name = row_type.into();
        Self::new(
            SchemaErrorCode::RowTypeAlreadyRegistered,
            format!("Row type '{}' is already registered", name),
        )
        .for_row_type(name)
    }

    /// Create an error for a record that does not decode into a row struct
    pub fn malformed_record(row_type: impl Into<String>, reason: impl Into<String>) -> Self {
        let name = row_type.into();
        Self::new(
            SchemaErrorCode::MalformedRecord,
            format!("Record does not decode as '{}': {}", name, reason.into()),
        )
        .for_row_type(name)
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the row type name if applicable
    pub fn row_type(&self) -> Option<&str> {
        self.row_type.as_deref()
    }

    /// Returns the offending identifier if applicable
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Returns whether the row type is unusable after this error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)?;
        if let Some(ref row_type) = self.row_type {
            write!(f, " (row type '{}')", row_type)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
