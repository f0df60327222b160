//! HTTP handlers for entity queries and the field catalog.

pub mod query;
pub use query::*;
