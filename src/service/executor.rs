//! Query execution: resolve, validate, compile, then one store round-trip.

use crate::error::{AppError, StoreError};
use crate::query::{compile_optional, validate_request, QueryRequest};
use crate::registry::{EntityTable, RegistryCatalog};
use crate::store::{EntityStore, OrderBy, SelectPlan, StorePage, Window};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// One page of results. `total` counts every match regardless of the window.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryPage {
    pub items: Vec<Value>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Clone)]
pub struct QueryExecutor {
    catalog: Arc<RegistryCatalog>,
    store: Arc<dyn EntityStore>,
    timeout: Option<Duration>,
}

impl QueryExecutor {
    pub fn new(catalog: Arc<RegistryCatalog>, store: Arc<dyn EntityStore>) -> Self {
        QueryExecutor {
            catalog,
            store,
            timeout: None,
        }
    }

    /// Deadline for each store call.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn catalog(&self) -> &RegistryCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    pub async fn execute(
        &self,
        entity: &str,
        request: &QueryRequest,
        sort_field: Option<&str>,
        sort_order: Option<&str>,
    ) -> Result<QueryPage, AppError> {
        let registered = self.catalog.entity(entity)?;
        validate_request(request, &registered.fields)?;
        let predicate = compile_optional(request.query.as_ref(), &registered.fields)?;

        let pagination = request.pagination;
        let plan = SelectPlan {
            predicate,
            order: sort_order_for(&registered.table, sort_field, sort_order),
            window: (!request.query_all).then(|| Window {
                limit: pagination.page_size,
                offset: pagination.offset(),
            }),
        };
        tracing::debug!(entity = %entity, predicate = %plan.predicate, "executing query");

        let page = self.run(&registered.table, &plan).await?;
        Ok(QueryPage {
            items: page.rows,
            total: page.total,
            page: pagination.page,
            page_size: pagination.page_size,
        })
    }

    async fn run(&self, table: &EntityTable, plan: &SelectPlan) -> Result<StorePage, StoreError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.store.run(table, plan))
                .await
                .map_err(|_| StoreError::Timeout(limit))?,
            None => self.store.run(table, plan).await,
        }
    }
}

/// Unknown sort fields are ignored with a warning; the listing falls back to primary-key order.
fn sort_order_for(
    table: &EntityTable,
    sort_field: Option<&str>,
    sort_order: Option<&str>,
) -> Option<OrderBy> {
    let field = sort_field.filter(|f| !f.is_empty())?;
    if !table.has_column(field) {
        tracing::warn!(entity = %table.entity, sort_field = %field, "ignoring unknown sort field");
        return None;
    }
    Some(OrderBy {
        column: field.to_string(),
        descending: sort_order.map_or(false, |o| o.eq_ignore_ascii_case("desc")),
    })
}
