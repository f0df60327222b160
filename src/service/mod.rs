//! QueryExecutor: runs validated, compiled queries against an entity store.

mod executor;
pub use executor::{QueryExecutor, QueryPage};
