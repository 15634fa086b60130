//! Normalized query fragments
//!
//! Every accepted clause becomes exactly one `Fragment`. Predicates use a
//! closed operator set, so an unknown operator cannot be represented.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::clause::ClauseKind;
use super::errors::QueryError;

/// Values supplied for placeholders, by placeholder name
pub type Bindings = HashMap<String, Value>;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// field = value
    Eq,
    /// field != value
    Neq,
    /// field > value
    Gt,
    /// field < value
    Lt,
    /// field >= value
    Gte,
    /// field <= value
    Lte,
    /// field IN (values...)
    In,
}

impl Operator {
    pub const ALL: [Operator; 7] = [
        Operator::Eq,
        Operator::Neq,
        Operator::Gt,
        Operator::Lt,
        Operator::Gte,
        Operator::Lte,
        Operator::In,
    ];

    /// Returns the operator tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::Gte => "gte",
            Operator::Lte => "lte",
            Operator::In => "in",
        }
    }

    /// Looks up an operator by tag
    pub fn from_tag(tag: &str) -> Option<Operator> {
        Self::ALL.into_iter().find(|op| op.as_str() == tag)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::from_tag(s).ok_or_else(|| QueryError::MalformedWhereClause(Value::String(s.to_string())))
    }
}

/// Stand-in for a value supplied later
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placeholder {
    name: String,
    /// Written as `field: placeholder`; the operator is picked from the
    /// shape of the bound value.
    #[serde(skip)]
    shorthand: bool,
}

impl Placeholder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shorthand: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_shorthand(&self) -> bool {
        self.shorthand
    }
}

/// Right-hand side of a predicate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Operand {
    Literal(Value),
    Bound(Placeholder),
}

impl Operand {
    pub fn is_bound(&self) -> bool {
        matches!(self, Operand::Bound(_))
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Operand::Literal(v) => Some(v),
            Operand::Bound(_) => None,
        }
    }

    pub fn placeholder(&self) -> Option<&Placeholder> {
        match self {
            Operand::Literal(_) => None,
            Operand::Bound(p) => Some(p),
        }
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Literal(value)
    }
}

impl From<Placeholder> for Operand {
    fn from(placeholder: Placeholder) -> Self {
        Operand::Bound(placeholder)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(v) => write!(f, "{}", v),
            Operand::Bound(p) => write!(f, ":{}", p.name),
        }
    }
}

/// A single comparison on one field.
///
/// Only normalized predicates can be built: `in` always carries a sequence
/// or a placeholder, and a shorthand value is never an object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Predicate {
    field: String,
    operator: Operator,
    value: Operand,
}

impl Predicate {
    pub(crate) fn new(field: impl Into<String>, operator: Operator, value: impl Into<Operand>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &Operand {
        &self.value
    }

    /// `field: value` form: `in` for a sequence, `eq` for anything else.
    /// A placeholder stays `eq` until its value is known. Returns `None` for
    /// an object literal, which has no shorthand meaning.
    pub fn shorthand(field: impl Into<String>, value: impl Into<Operand>) -> Option<Self> {
        let value = match value.into() {
            Operand::Bound(mut p) => {
                p.shorthand = true;
                Operand::Bound(p)
            }
            Operand::Literal(Value::Object(_)) => return None,
            literal => literal,
        };
        let operator = match &value {
            Operand::Literal(Value::Array(_)) => Operator::In,
            _ => Operator::Eq,
        };
        Some(Self::new(field, operator, value))
    }

    /// Explicit form. Returns `None` for `in` against a non-sequence literal.
    pub fn explicit(
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<Operand>,
    ) -> Option<Self> {
        let value = value.into();
        if operator == Operator::In {
            if let Operand::Literal(ref v) = value {
                if !v.is_array() {
                    return None;
                }
            }
        }
        Some(Self::new(field, operator, value))
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Operand>) -> Self {
        Self::new(field, Operator::Eq, value)
    }

    pub fn neq(field: impl Into<String>, value: impl Into<Operand>) -> Self {
        Self::new(field, Operator::Neq, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Operand>) -> Self {
        Self::new(field, Operator::Gt, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Operand>) -> Self {
        Self::new(field, Operator::Lt, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Operand>) -> Self {
        Self::new(field, Operator::Gte, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Operand>) -> Self {
        Self::new(field, Operator::Lte, value)
    }

    pub fn in_list(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(field, Operator::In, Value::Array(values))
    }

    /// Replaces a placeholder with its bound value, re-running the same
    /// normalization the literal would have gone through.
    ///
    /// Returns `Ok(None)` when the placeholder has no binding, and `Err` with
    /// the resolved clause when it no longer normalizes (`in` bound to a
    /// non-sequence, or a shorthand bound to an object).
    pub(crate) fn resolve(&self, bindings: &Bindings) -> Result<Option<Predicate>, Value> {
        let Operand::Bound(placeholder) = &self.value else {
            return Ok(Some(self.clone()));
        };
        let Some(bound) = bindings.get(placeholder.name()) else {
            return Ok(None);
        };
        if placeholder.is_shorthand() {
            return Predicate::shorthand(&self.field, bound.clone())
                .map(Some)
                .ok_or_else(|| self.resolved_clause(bound.clone()));
        }
        Predicate::explicit(&self.field, self.operator, bound.clone())
            .map(Some)
            .ok_or_else(|| {
                let mut comparison = serde_json::Map::new();
                comparison.insert(self.operator.as_str().to_string(), bound.clone());
                self.resolved_clause(Value::Object(comparison))
            })
    }

    /// `{field: value}`, the raw clause a resolution failure reports
    fn resolved_clause(&self, value: Value) -> Value {
        let mut clause = serde_json::Map::new();
        clause.insert(self.field.clone(), value);
        Value::Object(clause)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.value)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn from_tag(tag: &str) -> Option<SortDirection> {
        match tag {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// Ordering on a single field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.direction.as_str())
    }
}

/// One normalized clause, ready to be incorporated
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "clause", content = "value", rename_all = "snake_case")]
pub enum Fragment {
    From(String),
    Select(Vec<String>),
    Where(Predicate),
    OrderBy(OrderBy),
    Limit(u64),
    AllowFiltering(bool),
}

impl Fragment {
    /// Clause kind this fragment fills
    pub fn kind(&self) -> ClauseKind {
        match self {
            Fragment::From(_) => ClauseKind::From,
            Fragment::Select(_) => ClauseKind::Select,
            Fragment::Where(_) => ClauseKind::Where,
            Fragment::OrderBy(_) => ClauseKind::OrderBy,
            Fragment::Limit(_) => ClauseKind::Limit,
            Fragment::AllowFiltering(_) => ClauseKind::AllowFiltering,
        }
    }
}
