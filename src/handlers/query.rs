//! Entity query handlers: structured query, simple listing, read by id, field catalog.

use crate::error::AppError;
use crate::extractors::ApiJson;
use crate::query::{Pagination, QueryNode, QueryRequest, QueryValue, Scalar};
use crate::registry::{FieldRegistry, FieldType};
use crate::response::{success_one_ok, success_page};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Listing page size when `page_size` is not given on `GET /:entity`.
const LIST_PAGE_SIZE: u32 = 10;

#[derive(Debug, Default, Deserialize)]
pub struct SortParams {
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
}

/// Query-string value typed by the field it filters; unparseable text stays a string so the
/// validator reports the mismatch.
fn query_value_for_field(fields: &FieldRegistry, name: &str, raw: &str) -> QueryValue {
    let field_type = fields.get(name).ok().map(|f| f.field_type);
    let scalar = match field_type {
        Some(FieldType::Integer) => raw.parse().map(Scalar::Int).ok(),
        Some(FieldType::Float) => raw.parse().map(Scalar::Float).ok(),
        Some(FieldType::Boolean) if raw.eq_ignore_ascii_case("true") => Some(Scalar::Bool(true)),
        Some(FieldType::Boolean) if raw.eq_ignore_ascii_case("false") => Some(Scalar::Bool(false)),
        _ => None,
    };
    QueryValue::One(scalar.unwrap_or_else(|| Scalar::Str(raw.to_string())))
}

fn parse_page_param(name: &str, raw: &str) -> Result<u32, AppError> {
    raw.parse().map_err(|_| {
        AppError::BadRequest(format!("{} must be a positive integer, got '{}'", name, raw))
    })
}

/// POST /:entity/query
pub async fn query(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Query(sort): Query<SortParams>,
    ApiJson(request): ApiJson<QueryRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let page = state
        .executor
        .execute(&entity, &request, sort.sort_field.as_deref(), sort.sort_order.as_deref())
        .await?;
    Ok(success_page(page))
}

/// GET /:entity. Every parameter other than paging and sorting is an `=` condition,
/// combined with AND.
pub async fn list(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let fields = state.executor.catalog().fields(&entity)?;

    let mut pagination = Pagination::new(1, LIST_PAGE_SIZE);
    let mut sort = SortParams::default();
    let mut conditions = Vec::new();
    for (k, v) in params {
        match k.as_str() {
            "page" => pagination.page = parse_page_param("page", &v)?,
            "page_size" => pagination.page_size = parse_page_param("page_size", &v)?,
            "sort_field" => sort.sort_field = Some(v),
            "sort_order" => sort.sort_order = Some(v),
            _ => {
                let value = query_value_for_field(fields, &k, &v);
                conditions.push(QueryNode::condition(&k, "=", value));
            }
        }
    }

    let request = QueryRequest {
        query: (!conditions.is_empty()).then(|| QueryNode::and(conditions)),
        pagination,
        query_all: false,
    };
    let page = state
        .executor
        .execute(&entity, &request, sort.sort_field.as_deref(), sort.sort_order.as_deref())
        .await?;
    Ok(success_page(page))
}

/// GET /:entity/:id
pub async fn read(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let registered = state.executor.catalog().entity(&entity)?;
    let pk = registered.table.primary_key.as_str();
    let value = query_value_for_field(&registered.fields, pk, &id);
    let request = QueryRequest::new(QueryNode::condition(pk, "=", value)).page(1, 1);

    let page = state.executor.execute(&entity, &request, None, None).await?;
    let row = page
        .items
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound(format!("{} {}", entity, id)))?;
    Ok(success_one_ok(row))
}

/// GET /:entity/fields
pub async fn fields(
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let fields = state.executor.catalog().all_fields(&entity)?;
    Ok(success_one_ok(fields.clone()))
}
