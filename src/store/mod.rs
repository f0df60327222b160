//! Store seam: runs a compiled select plan against an entity's rows.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::StoreError;
use crate::query::Predicate;
use crate::registry::EntityTable;
use async_trait::async_trait;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}

/// Rows to return after ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub limit: u32,
    pub offset: u64,
}

/// What to fetch: filter, order, and an optional window. No window returns every match.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectPlan {
    pub predicate: Predicate,
    pub order: Option<OrderBy>,
    pub window: Option<Window>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StorePage {
    /// One JSON object per row, keyed by column name.
    pub rows: Vec<Value>,
    /// Matches before the window was applied.
    pub total: u64,
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn run(&self, table: &EntityTable, plan: &SelectPlan) -> Result<StorePage, StoreError>;

    /// Liveness check used by `/ready`.
    async fn ping(&self) -> Result<(), StoreError>;
}
