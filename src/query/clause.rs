//! Clause kinds and normalization of raw clause input
//!
//! Raw clauses arrive as JSON values. Each kind accepts a small set of
//! shapes and turns them into exactly one `Fragment`; any other shape is
//! rejected before the query is touched.
//!
//! `where` shapes:
//!
//! ```text
//! {"age": 30}                      age eq 30
//! {"age": [20, 30]}                age in [20, 30]
//! {"age": {"gt": 30}}              age gt 30
//! ["age", "gte", 30]               age gte 30
//! {"age": {"$bound": "min_age"}}   age eq :min_age (decided on resolve)
//! ```

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use super::errors::{QueryError, QueryResult};
use super::fragment::{Fragment, Operand, Operator, OrderBy, Placeholder, Predicate, SortDirection};

/// Recognized clause kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseKind {
    From,
    Select,
    Where,
    OrderBy,
    Limit,
    AllowFiltering,
}

impl ClauseKind {
    pub const ALL: [ClauseKind; 6] = [
        ClauseKind::From,
        ClauseKind::Select,
        ClauseKind::Where,
        ClauseKind::OrderBy,
        ClauseKind::Limit,
        ClauseKind::AllowFiltering,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClauseKind::From => "from",
            ClauseKind::Select => "select",
            ClauseKind::Where => "where",
            ClauseKind::OrderBy => "order_by",
            ClauseKind::Limit => "limit",
            ClauseKind::AllowFiltering => "allow_filtering",
        }
    }
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClauseKind {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClauseKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| QueryError::UnknownClauseKind(s.to_string()))
    }
}

/// Turns raw clause values into fragments
#[derive(Debug, Clone, Copy)]
pub(crate) struct Normalizer<'a> {
    placeholder_key: &'a str,
}

impl<'a> Normalizer<'a> {
    pub(crate) fn new(placeholder_key: &'a str) -> Self {
        Self { placeholder_key }
    }

    pub(crate) fn normalize(&self, kind: ClauseKind, raw: &Value) -> QueryResult<Fragment> {
        let fragment = match kind {
            ClauseKind::Where => {
                return self
                    .predicate(raw)
                    .map(Fragment::Where)
                    .ok_or_else(|| QueryError::MalformedWhereClause(raw.clone()));
            }
            ClauseKind::From => non_empty_str(raw).map(|s| Fragment::From(s.to_string())),
            ClauseKind::Select => field_list(raw).map(Fragment::Select),
            ClauseKind::OrderBy => order_by(raw).map(Fragment::OrderBy),
            ClauseKind::Limit => raw.as_u64().map(Fragment::Limit),
            ClauseKind::AllowFiltering => raw.as_bool().map(Fragment::AllowFiltering),
        };
        fragment.ok_or_else(|| QueryError::MalformedClause {
            kind,
            raw: raw.clone(),
        })
    }

    fn predicate(&self, raw: &Value) -> Option<Predicate> {
        match raw {
            Value::Object(map) => {
                let (field, value) = single_entry(map)?;
                if field.is_empty() || field == self.placeholder_key {
                    return None;
                }
                self.shorthand_or_operator(field, value)
            }
            Value::Array(items) => match items.as_slice() {
                [Value::String(field), Value::String(op), value] if !field.is_empty() => {
                    let operator = Operator::from_tag(op)?;
                    Predicate::explicit(field.as_str(), operator, self.operand(value)?)
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// `{field: value}` where `value` is a literal, a placeholder or a
    /// single `{op: value}` pair
    fn shorthand_or_operator(&self, field: &str, value: &Value) -> Option<Predicate> {
        let Value::Object(inner) = value else {
            return Predicate::shorthand(field, value.clone());
        };
        if let Some(placeholder) = self.placeholder(inner) {
            return placeholder.and_then(|p| Predicate::shorthand(field, p));
        }
        let (op, operand) = single_entry(inner)?;
        let operator = Operator::from_tag(op)?;
        Predicate::explicit(field, operator, self.operand(operand)?)
    }

    fn operand(&self, value: &Value) -> Option<Operand> {
        if let Value::Object(map) = value {
            if let Some(placeholder) = self.placeholder(map) {
                return placeholder.map(Operand::Bound);
            }
        }
        Some(Operand::Literal(value.clone()))
    }

    /// `None` if `map` is not a placeholder marker, `Some(None)` if it is
    /// one but badly formed.
    fn placeholder(&self, map: &Map<String, Value>) -> Option<Option<Placeholder>> {
        let name = map.get(self.placeholder_key)?;
        if map.len() != 1 {
            return Some(None);
        }
        Some(non_empty_str(name).map(Placeholder::new))
    }
}

fn single_entry(map: &Map<String, Value>) -> Option<(&str, &Value)> {
    if map.len() != 1 {
        return None;
    }
    map.iter().next().map(|(k, v)| (k.as_str(), v))
}

fn non_empty_str(raw: &Value) -> Option<&str> {
    raw.as_str().filter(|s| !s.is_empty())
}

fn field_list(raw: &Value) -> Option<Vec<String>> {
    match raw {
        Value::String(field) if !field.is_empty() => Some(vec![field.clone()]),
        Value::Array(items) if !items.is_empty() => items
            .iter()
            .map(|item| non_empty_str(item).map(str::to_string))
            .collect(),
        _ => None,
    }
}

fn order_by(raw: &Value) -> Option<OrderBy> {
    match raw {
        Value::String(field) if !field.is_empty() => Some(OrderBy::asc(field.as_str())),
        Value::Object(map) => {
            let (field, direction) = single_entry(map)?;
            if field.is_empty() {
                return None;
            }
            let direction = SortDirection::from_tag(direction.as_str()?)?;
            Some(OrderBy {
                field: field.to_string(),
                direction,
            })
        }
        _ => None,
    }
}
