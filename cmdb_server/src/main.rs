//! CMDB query server.
//!
//! Run from repo root: `cargo run -p cmdb-server`

use cmdb_query::registry::check_identifier;
use cmdb_query::{app, AppState, PgStore, QueryExecutor, RegistryCatalog, Settings};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cmdb_query=info,cmdb_server=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = Settings::from_env()?;
    check_identifier(&settings.schema)?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;

    let catalog = RegistryCatalog::with_defaults()?;
    tracing::info!(
        entities = ?catalog.entity_names(),
        schema = %settings.schema,
        "registry loaded"
    );

    let store = PgStore::new(pool, settings.schema.clone());
    let executor = QueryExecutor::new(Arc::new(catalog), Arc::new(store))
        .with_timeout(settings.query_timeout);
    let router = app(AppState::new(executor), settings.max_body_bytes);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("CMDB query server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
