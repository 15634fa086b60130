//! Explain output for accumulated queries
//!
//! Deterministic, human-readable view of what a query holds. Not a wire
//! statement; compilers produce those.

use std::fmt;

use super::errors::QueryError;
use super::value::QueryValue;

/// Explain output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainQuery {
    /// Whether the query was built
    pub accepted: bool,
    /// Row type the query runs against
    pub row_type: Option<String>,
    /// Source the query reads from
    pub source: Option<String>,
    /// Selected fields (None = all)
    pub select: Option<Vec<String>>,
    /// Predicates, most recent first
    pub predicates: Vec<String>,
    /// Ordering description
    pub order_by: Option<String>,
    pub limit: Option<u64>,
    pub allow_filtering: Option<bool>,
    /// Placeholders still pending
    pub pending: Vec<String>,
    /// Rejection reason (if rejected)
    pub rejection_reason: Option<String>,
    /// Rejection error code (if rejected)
    pub rejection_code: Option<String>,
}

impl ExplainQuery {
    /// Explains a built query
    pub fn from_query(query: &QueryValue) -> Self {
        Self {
            accepted: true,
            row_type: Some(query.descriptor().name().to_string()),
            source: Some(query.source().to_string()),
            select: query.select().map(<[String]>::to_vec),
            predicates: query.wheres().iter().map(ToString::to_string).collect(),
            order_by: query.order_by().map(ToString::to_string),
            limit: query.limit(),
            allow_filtering: query.allow_filtering(),
            pending: query.placeholders().map(|p| p.name().to_string()).collect(),
            rejection_reason: None,
            rejection_code: None,
        }
    }

    /// Explains a rejected clause
    pub fn from_error(err: &QueryError) -> Self {
        Self {
            accepted: false,
            row_type: None,
            source: None,
            select: None,
            predicates: Vec::new(),
            order_by: None,
            limit: None,
            allow_filtering: None,
            pending: Vec::new(),
            rejection_reason: Some(err.to_string()),
            rejection_code: Some(err.code().to_string()),
        }
    }
}

impl fmt::Display for ExplainQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN QUERY ===")?;

        if !self.accepted {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Error Code: {}", code)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
            return Ok(());
        }

        writeln!(f, "Status: ACCEPTED")?;
        if let Some(row_type) = &self.row_type {
            writeln!(f, "Row Type: {}", row_type)?;
        }
        if let Some(source) = &self.source {
            writeln!(f, "Source: {}", source)?;
        }
        match &self.select {
            Some(fields) => writeln!(f, "Select: {}", fields.join(", "))?,
            None => writeln!(f, "Select: *")?,
        }
        if !self.predicates.is_empty() {
            writeln!(f, "Predicates:")?;
            for pred in &self.predicates {
                writeln!(f, "  - {}", pred)?;
            }
        }
        if let Some(order) = &self.order_by {
            writeln!(f, "Order By: {}", order)?;
        }
        if let Some(limit) = self.limit {
            writeln!(f, "Limit: {}", limit)?;
        }
        if let Some(allow) = self.allow_filtering {
            writeln!(f, "Allow Filtering: {}", allow)?;
        }
        if !self.pending.is_empty() {
            writeln!(f, "Pending: {}", self.pending.join(", "))?;
        }

        Ok(())
    }
}
