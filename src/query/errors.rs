//! Query builder error types
//!
//! Error codes:
//! - WIDEROW_MALFORMED_WHERE_CLAUSE
//! - WIDEROW_MALFORMED_CLAUSE
//! - WIDEROW_UNKNOWN_CLAUSE_KIND
//! - WIDEROW_UNRESOLVED_PLACEHOLDER
//!
//! All of them reject the offending call; the query it was applied to is
//! left as it was.

use serde_json::Value;
use thiserror::Error;

use super::clause::ClauseKind;

/// Result type for query building
pub type QueryResult<T> = Result<T, QueryError>;

/// Query builder errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// `where` input is neither the explicit nor the shorthand form, or
    /// uses an operator outside the closed set
    #[error("Malformed where clause: {0}")]
    MalformedWhereClause(Value),

    /// Raw value has the wrong shape for its clause kind
    #[error("Malformed {kind} clause: {raw}")]
    MalformedClause { kind: ClauseKind, raw: Value },

    /// Clause kind outside the recognized set
    #[error("Unknown clause kind: {0}")]
    UnknownClauseKind(String),

    /// No value bound for a placeholder
    #[error("Unresolved placeholder: {0}")]
    UnresolvedPlaceholder(String),
}

impl QueryError {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::MalformedWhereClause(_) => "WIDEROW_MALFORMED_WHERE_CLAUSE",
            QueryError::MalformedClause { .. } => "WIDEROW_MALFORMED_CLAUSE",
            QueryError::UnknownClauseKind(_) => "WIDEROW_UNKNOWN_CLAUSE_KIND",
            QueryError::UnresolvedPlaceholder(_) => "WIDEROW_UNRESOLVED_PLACEHOLDER",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            QueryError::MalformedWhereClause(json!(1)).code(),
            "WIDEROW_MALFORMED_WHERE_CLAUSE"
        );
        assert_eq!(
            QueryError::UnknownClauseKind("group_by".into()).code(),
            "WIDEROW_UNKNOWN_CLAUSE_KIND"
        );
    }

    #[test]
    fn test_display_carries_raw_clause() {
        let err = QueryError::MalformedClause {
            kind: ClauseKind::Limit,
            raw: json!("ten"),
        };
        assert_eq!(err.to_string(), "Malformed limit clause: \"ten\"");

        let err = QueryError::MalformedWhereClause(json!({ "age": { "like": 3 } }));
        assert!(err.to_string().contains("like"));
    }
}
