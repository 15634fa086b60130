//! Query builder entry points
//!
//! `apply` normalizes one raw clause and folds it into a query. The input
//! query is never modified; on error nothing is produced.

use serde_json::Value;
use std::sync::Arc;

use super::clause::{ClauseKind, Normalizer};
use super::config::BuilderConfig;
use super::errors::{QueryError, QueryResult};
use super::fragment::Fragment;
use super::value::QueryValue;
use crate::observability::{log_event_with_fields, Event};
use crate::schema::RowTypeDescriptor;

/// Anything a query chain can start from or continue
pub trait Queryable {
    fn into_query(self) -> QueryValue;
}

impl Queryable for QueryValue {
    fn into_query(self) -> QueryValue {
        self
    }
}

impl Queryable for &QueryValue {
    fn into_query(self) -> QueryValue {
        self.clone()
    }
}

impl Queryable for Arc<RowTypeDescriptor> {
    fn into_query(self) -> QueryValue {
        QueryValue::from_descriptor(self)
    }
}

impl Queryable for &Arc<RowTypeDescriptor> {
    fn into_query(self) -> QueryValue {
        QueryValue::from_descriptor(Arc::clone(self))
    }
}

/// Normalizes raw clauses and accumulates them into queries
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    config: BuilderConfig,
}

impl QueryBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Normalizes a raw clause without touching any query.
    ///
    /// # Errors
    ///
    /// `MalformedWhereClause` for a bad `where`, `MalformedClause` for any
    /// other kind given the wrong shape.
    pub fn normalize(&self, kind: ClauseKind, raw: &Value) -> QueryResult<Fragment> {
        Normalizer::new(&self.config.placeholder_key)
            .normalize(kind, raw)
            .map_err(|err| {
                log_event_with_fields(
                    Event::ClauseRejected,
                    &[("clause", kind.as_str()), ("code", err.code())],
                );
                err
            })
    }

    /// Normalizes `raw` and folds it into `queryable`
    pub fn apply(
        &self,
        kind: ClauseKind,
        queryable: impl Queryable,
        raw: &Value,
    ) -> QueryResult<QueryValue> {
        let fragment = self.normalize(kind, raw)?;
        Ok(queryable.into_query().incorporate(fragment))
    }

    /// Like `apply`, with the clause kind given by name.
    ///
    /// # Errors
    ///
    /// `UnknownClauseKind` if `kind` is not a recognized clause name.
    pub fn apply_named(
        &self,
        kind: &str,
        queryable: impl Queryable,
        raw: &Value,
    ) -> QueryResult<QueryValue> {
        let kind = kind.parse::<ClauseKind>().map_err(|err: QueryError| {
            log_event_with_fields(Event::ClauseRejected, &[("clause", kind), ("code", err.code())]);
            err
        })?;
        self.apply(kind, queryable, raw)
    }
}
