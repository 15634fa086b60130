//! Accumulated query value
//!
//! A `QueryValue` is immutable from the caller's point of view: every
//! operation consumes or clones the value and returns a new one, so two
//! chains branching from the same query never see each other's clauses.

use serde::{Serialize, Serializer};
use std::sync::Arc;

use super::compiler::StatementCompiler;
use super::errors::{QueryError, QueryResult};
use super::fragment::{Bindings, Fragment, OrderBy, Placeholder, Predicate};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::RowTypeDescriptor;

/// Query accumulated against one row type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryValue {
    #[serde(rename = "row_type", serialize_with = "serialize_row_type")]
    descriptor: Arc<RowTypeDescriptor>,
    source: String,
    select: Option<Vec<String>>,
    /// Most recently added predicate first
    wheres: Vec<Predicate>,
    order_by: Option<OrderBy>,
    limit: Option<u64>,
    allow_filtering: Option<bool>,
}

fn serialize_row_type<S: Serializer>(
    descriptor: &Arc<RowTypeDescriptor>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(descriptor.name())
}

impl QueryValue {
    /// Creates an empty query reading from `source`
    pub fn new(descriptor: Arc<RowTypeDescriptor>, source: impl Into<String>) -> Self {
        Self {
            descriptor,
            source: source.into(),
            select: None,
            wheres: Vec::new(),
            order_by: None,
            limit: None,
            allow_filtering: None,
        }
    }

    /// Creates an empty query reading from the row type's own name
    pub fn from_descriptor(descriptor: Arc<RowTypeDescriptor>) -> Self {
        let source = descriptor.name().to_string();
        Self::new(descriptor, source)
    }

    pub fn descriptor(&self) -> &Arc<RowTypeDescriptor> {
        &self.descriptor
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn select(&self) -> Option<&[String]> {
        self.select.as_deref()
    }

    /// Predicates, most recently added first
    pub fn wheres(&self) -> &[Predicate] {
        &self.wheres
    }

    pub fn order_by(&self) -> Option<&OrderBy> {
        self.order_by.as_ref()
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn allow_filtering(&self) -> Option<bool> {
        self.allow_filtering
    }

    /// Folds one fragment into the query.
    ///
    /// `where` fragments are prepended and never de-duplicated; every other
    /// kind replaces its slot.
    pub fn incorporate(mut self, fragment: Fragment) -> Self {
        match fragment {
            Fragment::Where(predicate) => self.wheres.insert(0, predicate),
            Fragment::From(source) => self.source = source,
            Fragment::Select(fields) => self.select = Some(fields),
            Fragment::OrderBy(order) => self.order_by = Some(order),
            Fragment::Limit(limit) => self.limit = Some(limit),
            Fragment::AllowFiltering(allow) => self.allow_filtering = Some(allow),
        }
        self
    }

    pub fn with_predicate(self, predicate: Predicate) -> Self {
        self.incorporate(Fragment::Where(predicate))
    }

    pub fn with_source(self, source: impl Into<String>) -> Self {
        self.incorporate(Fragment::From(source.into()))
    }

    pub fn with_select<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.incorporate(Fragment::Select(fields.into_iter().map(Into::into).collect()))
    }

    pub fn with_order_by(self, order: OrderBy) -> Self {
        self.incorporate(Fragment::OrderBy(order))
    }

    pub fn with_limit(self, limit: u64) -> Self {
        self.incorporate(Fragment::Limit(limit))
    }

    pub fn with_allow_filtering(self, allow: bool) -> Self {
        self.incorporate(Fragment::AllowFiltering(allow))
    }

    /// Predicates on `field`, most recent first
    pub fn predicates_on<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Predicate> + 'a {
        self.wheres.iter().filter(move |p| p.field() == field)
    }

    /// Placeholders still waiting for a value
    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.wheres.iter().filter_map(|p| p.value().placeholder())
    }

    pub fn is_resolved(&self) -> bool {
        self.placeholders().next().is_none()
    }

    /// Replaces every placeholder with its bound value.
    ///
    /// # Errors
    ///
    /// - `UnresolvedPlaceholder` for the first placeholder without a binding
    /// - `MalformedWhereClause` if a bound value does not fit its operator
    pub fn resolve(&self, bindings: &Bindings) -> QueryResult<QueryValue> {
        let mut wheres = Vec::with_capacity(self.wheres.len());
        let mut resolved = 0usize;
        for predicate in &self.wheres {
            if predicate.value().is_bound() {
                resolved += 1;
            }
            match predicate.resolve(bindings) {
                Ok(Some(p)) => wheres.push(p),
                Ok(None) => {
                    let name = predicate
                        .value()
                        .placeholder()
                        .map(|p| p.name().to_string())
                        .unwrap_or_default();
                    return Err(QueryError::UnresolvedPlaceholder(name));
                }
                Err(raw) => return Err(QueryError::MalformedWhereClause(raw)),
            }
        }

        let count = resolved.to_string();
        log_event_with_fields(
            Event::PlaceholdersResolved,
            &[("row_type", self.descriptor.name()), ("count", count.as_str())],
        );
        Ok(QueryValue {
            wheres,
            ..self.clone()
        })
    }

    /// Hands the finished query to a compiler.
    ///
    /// # Errors
    ///
    /// `UnresolvedPlaceholder` (converted into the compiler's error) if any
    /// placeholder is still pending, otherwise whatever the compiler reports.
    pub fn compile_with<C>(&self, compiler: &C) -> Result<C::Statement, C::Error>
    where
        C: StatementCompiler,
        C::Error: From<QueryError>,
    {
        if let Some(pending) = self.placeholders().next() {
            return Err(QueryError::UnresolvedPlaceholder(pending.name().to_string()).into());
        }
        compiler.compile(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::fragment::Operator;
    use crate::schema::{FieldType, RowTypeDraft};
    use serde_json::json;

    fn events() -> Arc<RowTypeDescriptor> {
        Arc::new(
            RowTypeDraft::new("events")
                .field("bucket", FieldType::Text)
                .field("ts", FieldType::Timestamp)
                .field("tag", FieldType::Text)
                .partition_key("bucket")
                .clustering_keys(["ts"])
                .finish()
                .unwrap(),
        )
    }

    #[test]
    fn test_empty_query() {
        let q = QueryValue::from_descriptor(events());
        assert_eq!(q.source(), "events");
        assert!(q.wheres().is_empty());
        assert_eq!(q.limit(), None);
        assert_eq!(q.select(), None);
        assert_eq!(q.allow_filtering(), None);
    }

    #[test]
    fn test_where_prepends() {
        let q = QueryValue::from_descriptor(events())
            .with_predicate(Predicate::eq("bucket", json!("b1")))
            .with_predicate(Predicate::gt("ts", json!(100)));
        assert_eq!(
            q.wheres(),
            [Predicate::gt("ts", json!(100)), Predicate::eq("bucket", json!("b1"))]
        );
    }

    #[test]
    fn test_where_keeps_duplicates() {
        let p = Predicate::eq("bucket", json!("b1"));
        let q = QueryValue::from_descriptor(events())
            .with_predicate(p.clone())
            .with_predicate(p);
        assert_eq!(q.wheres().len(), 2);
        assert_eq!(q.predicates_on("bucket").count(), 2);
    }

    #[test]
    fn test_single_valued_slots_last_write_wins() {
        let q = QueryValue::from_descriptor(events())
            .with_limit(10)
            .with_limit(20)
            .with_order_by(OrderBy::asc("ts"))
            .with_order_by(OrderBy::desc("ts"))
            .with_source("events_by_day")
            .with_select(["ts"])
            .with_select(["ts", "tag"])
            .with_allow_filtering(true)
            .with_allow_filtering(false);
        assert_eq!(q.limit(), Some(20));
        assert_eq!(q.order_by(), Some(&OrderBy::desc("ts")));
        assert_eq!(q.source(), "events_by_day");
        assert_eq!(q.select(), Some(&["ts".to_string(), "tag".to_string()][..]));
        assert_eq!(q.allow_filtering(), Some(false));
    }

    #[test]
    fn test_branches_are_independent() {
        let base = QueryValue::from_descriptor(events()).with_predicate(Predicate::eq("bucket", json!("b1")));
        let a = base.clone().with_predicate(Predicate::gt("ts", json!(1)));
        let b = base.clone().with_limit(5);
        assert_eq!(base.wheres().len(), 1);
        assert_eq!(a.wheres().len(), 2);
        assert_eq!(a.limit(), None);
        assert_eq!(b.wheres().len(), 1);
        assert!(Arc::ptr_eq(a.descriptor(), b.descriptor()));
    }

    #[test]
    fn test_resolve_placeholders() {
        let q = QueryValue::from_descriptor(events())
            .with_predicate(Predicate::shorthand("tag", Placeholder::new("tags")).unwrap())
            .with_predicate(Predicate::gt("ts", Placeholder::new("since")));
        assert!(!q.is_resolved());
        let names: Vec<&str> = q.placeholders().map(|p| p.name()).collect();
        assert_eq!(names, vec!["since", "tags"]);

        let mut bindings = Bindings::new();
        bindings.insert("since".into(), json!(100));
        bindings.insert("tags".into(), json!(["a", "b"]));
        let resolved = q.resolve(&bindings).unwrap();
        assert!(resolved.is_resolved());
        assert_eq!(resolved.wheres()[0], Predicate::gt("ts", json!(100)));
        assert_eq!(resolved.wheres()[1].operator(), Operator::In);

        // the original still has its placeholders
        assert!(!q.is_resolved());
    }

    #[test]
    fn test_resolve_missing_binding() {
        let q = QueryValue::from_descriptor(events())
            .with_predicate(Predicate::eq("tag", Placeholder::new("tag")));
        assert_eq!(
            q.resolve(&Bindings::new()),
            Err(QueryError::UnresolvedPlaceholder("tag".into()))
        );
    }

    #[test]
    fn test_resolve_bad_in_binding() {
        let q = QueryValue::from_descriptor(events())
            .with_predicate(Predicate::new("tag", Operator::In, Placeholder::new("tags")));
        let mut bindings = Bindings::new();
        bindings.insert("tags".into(), json!("a"));
        let err = q.resolve(&bindings).unwrap_err();
        assert_eq!(err.code(), "WIDEROW_MALFORMED_WHERE_CLAUSE");
    }

    #[test]
    fn test_serializes_row_type_by_name() {
        let q = QueryValue::from_descriptor(events())
            .with_predicate(Predicate::eq("bucket", json!("b1")))
            .with_limit(20);
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(value["row_type"], json!("events"));
        assert_eq!(value["source"], json!("events"));
        assert_eq!(value["limit"], json!(20));
        assert_eq!(value["wheres"][0]["field"], json!("bucket"));
        assert_eq!(value["wheres"][0]["operator"], json!("eq"));
    }
}
