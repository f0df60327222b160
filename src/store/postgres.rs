//! PostgreSQL store over a sqlx pool.

use super::{EntityStore, SelectPlan, StorePage};
use crate::error::StoreError;
use crate::registry::EntityTable;
use crate::sql::{bind_all, select_count, select_page};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    schema: String,
}

impl PgStore {
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        PgStore {
            pool,
            schema: schema.into(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl EntityStore for PgStore {
    /// Count and page run on one pooled connection, released when it drops.
    async fn run(&self, table: &EntityTable, plan: &SelectPlan) -> Result<StorePage, StoreError> {
        let mut conn = self.pool.acquire().await?;

        let count = select_count(table, &self.schema, &plan.predicate);
        tracing::debug!(sql = %count.sql, params = ?count.params, "count");
        let row = bind_all(&count.sql, &count.params).fetch_one(&mut *conn).await?;
        let total: i64 = row.try_get(0)?;

        let page = select_page(table, &self.schema, plan);
        tracing::debug!(sql = %page.sql, params = ?page.params, "query");
        let rows = bind_all(&page.sql, &page.params).fetch_all(&mut *conn).await?;

        Ok(StorePage {
            rows: rows.iter().map(row_to_json).collect(),
            total: total.max(0) as u64,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

fn row_to_json(row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::Column;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
        return Value::String(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<Value>, _>(name) {
        return j;
    }
    Value::Null
}
