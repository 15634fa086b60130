//! Query builder
//!
//! Accumulates normalized clause fragments into an immutable `QueryValue`
//! bound to one row-type descriptor:
//!
//! ```ignore
//! let builder = QueryBuilder::default();
//! let q = builder.apply(ClauseKind::Where, &descriptor, &json!({ "bucket": "b1" }))?;
//! let q = builder.apply(ClauseKind::Where, &q, &json!({ "ts": { "gt": 100 } }))?;
//! let q = builder.apply(ClauseKind::Limit, &q, &json!(20))?;
//! ```
//!
//! The builder checks clause shape only. Whether a predicate is efficient
//! or even valid against the row type's keys is the compiler's concern.

mod builder;
mod clause;
mod compiler;
mod config;
mod errors;
mod explain;
mod fragment;
mod value;

pub use builder::{QueryBuilder, Queryable};
pub use clause::ClauseKind;
pub use compiler::StatementCompiler;
pub use config::BuilderConfig;
pub use errors::{QueryError, QueryResult};
pub use explain::ExplainQuery;
pub use fragment::{Bindings, Fragment, Operand, Operator, OrderBy, Placeholder, Predicate, SortDirection};
pub use value::QueryValue;
