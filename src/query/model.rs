//! Condition tree, pagination and request types as they arrive from callers.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A single literal in a condition value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Float(n) => write!(f, "{}", n),
            Scalar::Str(s) => write!(f, "{:?}", s),
        }
    }
}

/// A condition value. `Other` holds any JSON that is neither a scalar nor a list of scalars,
/// including null and a missing `value` key, so the validator can reject it by field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    One(Scalar),
    Many(Vec<Scalar>),
    Other(serde_json::Value),
}

impl QueryValue {
    pub fn is_list(&self) -> bool {
        matches!(self, QueryValue::Many(_))
    }

    /// The value's literals: one for a scalar, every element for a list, none otherwise.
    pub fn scalars(&self) -> &[Scalar] {
        match self {
            QueryValue::One(s) => std::slice::from_ref(s),
            QueryValue::Many(list) => list,
            QueryValue::Other(_) => &[],
        }
    }
}

fn missing_value() -> QueryValue {
    QueryValue::Other(serde_json::Value::Null)
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::One(s) => write!(f, "{}", s),
            QueryValue::Many(list) => {
                let parts: Vec<String> = list.iter().map(|s| s.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            QueryValue::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        QueryValue::One(Scalar::Str(s.to_string()))
    }
}

impl From<i64> for QueryValue {
    fn from(n: i64) -> Self {
        QueryValue::One(Scalar::Int(n))
    }
}

impl From<f64> for QueryValue {
    fn from(n: f64) -> Self {
        QueryValue::One(Scalar::Float(n))
    }
}

impl From<bool> for QueryValue {
    fn from(b: bool) -> Self {
        QueryValue::One(Scalar::Bool(b))
    }
}

impl From<Vec<Scalar>> for QueryValue {
    fn from(list: Vec<Scalar>) -> Self {
        QueryValue::Many(list)
    }
}

/// Leaf: `field operator value`. The operator stays a raw token until validated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryCondition {
    pub field: String,
    pub operator: String,
    #[serde(default = "missing_value")]
    pub value: QueryValue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupOperator {
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
}

impl fmt::Display for GroupOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupOperator::And => f.write_str("AND"),
            GroupOperator::Or => f.write_str("OR"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryGroup {
    pub operator: GroupOperator,
    pub conditions: Vec<QueryNode>,
}

/// A node of the condition tree. JSON with `conditions` is a group, anything else a condition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryNode {
    Group(QueryGroup),
    Condition(QueryCondition),
}

impl QueryNode {
    pub fn condition(field: &str, operator: &str, value: impl Into<QueryValue>) -> Self {
        QueryNode::Condition(QueryCondition {
            field: field.to_string(),
            operator: operator.to_string(),
            value: value.into(),
        })
    }

    pub fn and(conditions: Vec<QueryNode>) -> Self {
        QueryNode::Group(QueryGroup {
            operator: GroupOperator::And,
            conditions,
        })
    }

    pub fn or(conditions: Vec<QueryNode>) -> Self {
        QueryNode::Group(QueryGroup {
            operator: GroupOperator::Or,
            conditions,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl Pagination {
    pub fn new(page: u32, page_size: u32) -> Self {
        Pagination { page, page_size }
    }

    pub fn is_valid(&self) -> bool {
        self.page >= 1 && (1..=MAX_PAGE_SIZE).contains(&self.page_size)
    }

    /// Rows to skip before this page. Saturates rather than overflowing for absurd page numbers.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Absent means match every row.
    #[serde(default)]
    pub query: Option<QueryNode>,
    #[serde(default)]
    pub pagination: Pagination,
    /// Return every matching row; the page values are still echoed back.
    #[serde(default)]
    pub query_all: bool,
}

impl QueryRequest {
    pub fn new(query: QueryNode) -> Self {
        QueryRequest {
            query: Some(query),
            ..Default::default()
        }
    }

    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.pagination = Pagination::new(page, page_size);
        self
    }

    pub fn all(mut self) -> Self {
        self.query_all = true;
        self
    }
}
