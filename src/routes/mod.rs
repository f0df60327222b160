mod common;
mod query;

pub use common::common_routes;
pub use query::query_routes;

use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, Router};

/// Every route, with request bodies capped at `max_body_bytes`. Oversized bodies are
/// rejected by the JSON extractor with a `payload_too_large` error.
pub fn app(state: AppState, max_body_bytes: usize) -> Router {
    common_routes(state.clone())
        .merge(query_routes(state))
        .layer(DefaultBodyLimit::max(max_body_bytes))
}
