//! Typed errors and HTTP mapping.

use crate::query::GroupOperator;
use crate::registry::FieldType;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Faults in the caller's query: the tree, its values, or the pagination window.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("unknown entity: {0}")]
    UnknownEntity(String),
    #[error("unknown field: {field}")]
    UnknownField { field: String },
    #[error("field '{field}' does not support operator '{operator}'")]
    UnsupportedOperator { field: String, operator: String },
    #[error("field '{field}' with operator '{operator}' expects {expected}, got {value}")]
    TypeMismatch {
        field: String,
        operator: String,
        expected: String,
        value: String,
    },
    #[error("field '{field}' does not accept multiple values (operator '{operator}')")]
    MultiValueNotAllowed { field: String, operator: String },
    #[error("{operator} group must contain at least one condition")]
    EmptyGroup { operator: GroupOperator },
    #[error("operator '{operator}' cannot be applied to {field_type} field '{field}'")]
    UnsupportedCombination {
        field: String,
        field_type: FieldType,
        operator: String,
    },
    #[error(
        "invalid pagination: page {page}, page_size {page_size} \
         (page >= 1, 1 <= page_size <= 1000)"
    )]
    InvalidPagination { page: u32, page_size: u32 },
}

impl QueryError {
    /// Stable machine-readable code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::UnknownEntity(_) => "unknown_entity",
            QueryError::UnknownField { .. } => "unknown_field",
            QueryError::UnsupportedOperator { .. } => "unsupported_operator",
            QueryError::TypeMismatch { .. } => "type_mismatch",
            QueryError::MultiValueNotAllowed { .. } => "multi_value_not_allowed",
            QueryError::EmptyGroup { .. } => "empty_group",
            QueryError::UnsupportedCombination { .. } => "unsupported_combination",
            QueryError::InvalidPagination { .. } => "invalid_pagination",
        }
    }

    /// Field and operator that triggered the error, for client-side correction.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            QueryError::UnknownField { field } => Some(serde_json::json!({ "field": field })),
            QueryError::UnsupportedOperator { field, operator }
            | QueryError::MultiValueNotAllowed { field, operator }
            | QueryError::UnsupportedCombination { field, operator, .. } => {
                Some(serde_json::json!({ "field": field, "operator": operator }))
            }
            QueryError::TypeMismatch {
                field,
                operator,
                expected,
                value,
            } => Some(serde_json::json!({
                "field": field,
                "operator": operator,
                "expected": expected,
                "value": value,
            })),
            QueryError::EmptyGroup { operator } => {
                Some(serde_json::json!({ "operator": operator }))
            }
            QueryError::InvalidPagination { page, page_size } => {
                Some(serde_json::json!({ "page": page, "page_size": page_size }))
            }
            QueryError::UnknownEntity(_) => None,
        }
    }
}

/// Startup faults while building the registry catalog.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("entity '{0}' is already registered")]
    DuplicateEntity(String),
    #[error("entity '{0}' has no table registered")]
    UnknownEntity(String),
    #[error("field '{field}' of entity '{entity}' is already registered with a different config")]
    DuplicateField { entity: String, field: String },
    #[error("invalid config for field '{field}': {reason}")]
    InvalidFieldConfig { field: String, reason: String },
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}

/// Backing store failures. Infrastructure errors, never retried here.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("store call exceeded {0:?}")]
    Timeout(Duration),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Query(QueryError::UnknownEntity(_)) => {
                (StatusCode::NOT_FOUND, "unknown_entity")
            }
            AppError::Query(e) => (StatusCode::BAD_REQUEST, e.code()),
            AppError::Registry(_) => (StatusCode::INTERNAL_SERVER_ERROR, "registry_error"),
            AppError::Store(StoreError::Timeout(_)) => {
                (StatusCode::GATEWAY_TIMEOUT, "store_timeout")
            }
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let details = match &self {
            AppError::Query(e) => e.details(),
            _ => None,
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_errors_map_to_client_faults() {
        let err = AppError::from(QueryError::UnsupportedOperator {
            field: "is_valid".into(),
            operator: "like".into(),
        });
        assert_eq!(err.status_and_code(), (StatusCode::BAD_REQUEST, "unsupported_operator"));
        assert!(err.to_string().contains("is_valid"));
        assert!(err.to_string().contains("like"));
    }

    #[test]
    fn unknown_entity_is_not_found() {
        let err = AppError::from(QueryError::UnknownEntity("rack".into()));
        assert_eq!(err.status_and_code().0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn store_errors_map_to_server_faults() {
        let timeout = AppError::from(StoreError::Timeout(Duration::from_millis(5)));
        assert_eq!(timeout.status_and_code().0, StatusCode::GATEWAY_TIMEOUT);
        let down = AppError::from(StoreError::Unavailable("pool closed".into()));
        assert_eq!(down.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn body_faults_map_to_client_faults() {
        let big = AppError::PayloadTooLarge("length limit exceeded".into());
        assert_eq!(big.status_and_code(), (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"));
        let bad = AppError::BadRequest("missing field `operator`".into());
        assert_eq!(bad.status_and_code(), (StatusCode::BAD_REQUEST, "bad_request"));
    }

    #[test]
    fn details_name_field_and_operator() {
        let err = QueryError::MultiValueNotAllowed {
            field: "service_tag".into(),
            operator: "in".into(),
        };
        let details = err.details().unwrap();
        assert_eq!(details["field"], "service_tag");
        assert_eq!(details["operator"], "in");
    }
}
