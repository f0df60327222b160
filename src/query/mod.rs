//! Query representation, validation and compilation.

pub mod compiler;
pub mod model;
pub mod predicate;
pub mod validator;

pub use compiler::{compile, compile_optional};
pub use model::{
    GroupOperator, Pagination, QueryCondition, QueryGroup, QueryNode, QueryRequest, QueryValue,
    Scalar, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use predicate::{parse_datetime, Comparison, Literal, Predicate};
pub use validator::{validate, validate_request};
