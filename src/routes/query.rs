//! Entity query routes. The entity is a path parameter resolved against the registry catalog.

use crate::handlers::{fields, list, query, read};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn query_routes(state: AppState) -> Router {
    Router::new()
        .route("/:entity", get(list))
        .route("/:entity/query", post(query))
        .route("/:entity/fields", get(fields))
        .route("/:entity/:id", get(read))
        .with_state(state)
}
