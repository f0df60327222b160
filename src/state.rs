//! Shared application state for all routes. Catalog and store are read-only after startup.

use crate::service::QueryExecutor;

#[derive(Clone)]
pub struct AppState {
    pub executor: QueryExecutor,
}

impl AppState {
    pub fn new(executor: QueryExecutor) -> Self {
        AppState { executor }
    }
}
