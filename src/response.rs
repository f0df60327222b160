//! Standard response envelope helpers.

use crate::service::QueryPage;
use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct SuccessOne<T> {
    pub data: T,
}

#[derive(Serialize)]
pub struct SuccessMany<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct PageMeta {
    /// Matching rows across all pages.
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    /// Rows in this response.
    pub count: u64,
}

pub fn success_one_ok<T: Serialize>(data: T) -> (StatusCode, Json<SuccessOne<T>>) {
    (StatusCode::OK, Json(SuccessOne { data }))
}

pub fn success_page(page: QueryPage) -> (StatusCode, Json<SuccessMany<serde_json::Value>>) {
    let count = page.items.len() as u64;
    (
        StatusCode::OK,
        Json(SuccessMany {
            data: page.items,
            meta: PageMeta {
                total: page.total,
                page: page.page,
                page_size: page.page_size,
                count,
            },
        }),
    )
}
