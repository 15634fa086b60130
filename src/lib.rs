//! widerow - Row-type declarations and query building for wide-column stores
//!
//! - `schema`: declare row types, validate their primary keys, parse records
//! - `query`: accumulate clause fragments into immutable query values
//! - `observability`: structured lifecycle events

pub mod observability;
pub mod query;
pub mod schema;
