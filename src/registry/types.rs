//! Field types, the operator vocabulary, and per-field configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    Datetime,
    Enum,
    MultiSelect,
}

impl FieldType {
    pub const ALL: [FieldType; 7] = [
        FieldType::String,
        FieldType::Integer,
        FieldType::Float,
        FieldType::Boolean,
        FieldType::Datetime,
        FieldType::Enum,
        FieldType::MultiSelect,
    ];

    /// Whether `op` is a legal operator for values of this type.
    pub fn supports(self, op: Operator) -> bool {
        use FieldType::*;
        match op {
            Operator::Eq | Operator::Ne => true,
            Operator::Gt | Operator::Lt | Operator::Ge | Operator::Le => {
                matches!(self, Integer | Float | Datetime)
            }
            Operator::Like => matches!(self, String),
            Operator::In => matches!(self, String | Integer | Float | Enum | MultiSelect),
        }
    }

    /// Every operator this type supports, in vocabulary order.
    pub fn default_operators(self) -> BTreeSet<Operator> {
        Operator::ALL.into_iter().filter(|op| self.supports(*op)).collect()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Datetime => "datetime",
            FieldType::Enum => "enum",
            FieldType::MultiSelect => "multi_select",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed global operator vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "like")]
    Like,
    #[serde(rename = "in")]
    In,
}

impl Operator {
    pub const ALL: [Operator; 8] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Lt,
        Operator::Ge,
        Operator::Le,
        Operator::Like,
        Operator::In,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Like => "like",
            Operator::In => "in",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownOperator(pub String);

impl FromStr for Operator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.token() == s)
            .ok_or_else(|| UnknownOperator(s.to_string()))
    }
}

/// Queryable field: declared type, legal operators, and allowed literals for enums.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub description: String,
    pub operators: BTreeSet<Operator>,
    #[serde(default)]
    pub is_multi_select: bool,
    #[serde(default)]
    pub enum_values: Option<Vec<String>>,
}

impl FieldConfig {
    /// Field with every operator its type supports.
    pub fn new(
        name: impl Into<String>,
        field_type: FieldType,
        description: impl Into<String>,
    ) -> Self {
        FieldConfig {
            name: name.into(),
            field_type,
            description: description.into(),
            operators: field_type.default_operators(),
            is_multi_select: false,
            enum_values: None,
        }
    }

    /// Restrict the legal operators to `ops`.
    pub fn operators(mut self, ops: &[Operator]) -> Self {
        self.operators = ops.iter().copied().collect();
        self
    }

    pub fn multi_select(mut self) -> Self {
        self.is_multi_select = true;
        self
    }

    pub fn enum_values(mut self, values: &[&str]) -> Self {
        self.enum_values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn allows(&self, op: Operator) -> bool {
        self.operators.contains(&op)
    }

    pub fn allows_literal(&self, value: &str) -> bool {
        self.enum_values
            .as_ref()
            .map(|values| values.iter().any(|v| v == value))
            .unwrap_or(false)
    }
}
