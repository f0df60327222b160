//! Turns a condition tree into a store predicate, bottom-up.
//!
//! The compiler re-checks every leaf against the type/operator capability matrix on its own, so it
//! is safe to call on trees that never went through the validator.

use crate::error::QueryError;
use crate::query::model::{GroupOperator, QueryCondition, QueryGroup, QueryNode, QueryValue, Scalar};
use crate::query::predicate::{parse_datetime, Comparison, Literal, Predicate};
use crate::query::validator::{expected_shape, parse_operator, scalar_fits, type_mismatch};
use crate::registry::{FieldConfig, FieldRegistry, FieldType, Operator};

pub fn compile(node: &QueryNode, registry: &FieldRegistry) -> Result<Predicate, QueryError> {
    match node {
        QueryNode::Condition(cond) => compile_condition(cond, registry),
        QueryNode::Group(group) => compile_group(group, registry),
    }
}

/// Absent query compiles to the match-all predicate.
pub fn compile_optional(
    node: Option<&QueryNode>,
    registry: &FieldRegistry,
) -> Result<Predicate, QueryError> {
    match node {
        Some(node) => compile(node, registry),
        None => Ok(Predicate::All),
    }
}

fn compile_group(group: &QueryGroup, registry: &FieldRegistry) -> Result<Predicate, QueryError> {
    if group.conditions.is_empty() {
        return Err(QueryError::EmptyGroup {
            operator: group.operator,
        });
    }
    let children = group
        .conditions
        .iter()
        .map(|child| compile(child, registry))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(match group.operator {
        GroupOperator::And => Predicate::And(children),
        GroupOperator::Or => Predicate::Or(children),
    })
}

fn compile_condition(
    cond: &QueryCondition,
    registry: &FieldRegistry,
) -> Result<Predicate, QueryError> {
    let field = registry.get(&cond.field)?;
    let op = parse_operator(cond)?;
    let ordered = matches!(
        field.field_type,
        FieldType::Integer | FieldType::Float | FieldType::Datetime
    );

    match (field.field_type, op) {
        (_, Operator::Eq) => compare(cond, field, Comparison::Eq),
        (_, Operator::Ne) => compare(cond, field, Comparison::Ne),
        (_, Operator::Gt) if ordered => compare(cond, field, Comparison::Gt),
        (_, Operator::Lt) if ordered => compare(cond, field, Comparison::Lt),
        (_, Operator::Ge) if ordered => compare(cond, field, Comparison::Ge),
        (_, Operator::Le) if ordered => compare(cond, field, Comparison::Le),
        (FieldType::String, Operator::Like) => match single_literal(cond, field)? {
            Literal::Text(s) => Ok(Predicate::Like {
                column: cond.field.clone(),
                pattern: format!("%{}%", s),
            }),
            _ => Err(type_mismatch(cond, "a string")),
        },
        (
            FieldType::String
            | FieldType::Integer
            | FieldType::Float
            | FieldType::Enum
            | FieldType::MultiSelect,
            Operator::In,
        ) => match &cond.value {
            QueryValue::Many(list) => Ok(Predicate::In {
                column: cond.field.clone(),
                values: list
                    .iter()
                    .map(|s| literal(cond, field, s))
                    .collect::<Result<Vec<_>, _>>()?,
            }),
            QueryValue::One(_) => Err(type_mismatch(cond, "a list")),
            QueryValue::Other(_) => Err(type_mismatch(cond, &expected_shape(field))),
        },
        (field_type, _) => Err(QueryError::UnsupportedCombination {
            field: cond.field.clone(),
            field_type,
            operator: cond.operator.clone(),
        }),
    }
}

fn compare(
    cond: &QueryCondition,
    field: &FieldConfig,
    op: Comparison,
) -> Result<Predicate, QueryError> {
    Ok(Predicate::Compare {
        column: cond.field.clone(),
        op,
        value: single_literal(cond, field)?,
    })
}

fn single_literal(cond: &QueryCondition, field: &FieldConfig) -> Result<Literal, QueryError> {
    match &cond.value {
        QueryValue::One(s) => literal(cond, field, s),
        QueryValue::Many(_) => Err(type_mismatch(cond, "a single value")),
        QueryValue::Other(_) => Err(type_mismatch(cond, &expected_shape(field))),
    }
}

/// Convert one scalar to the literal type of its field.
fn literal(
    cond: &QueryCondition,
    field: &FieldConfig,
    scalar: &Scalar,
) -> Result<Literal, QueryError> {
    if !scalar_fits(field, scalar) {
        return Err(type_mismatch(cond, &expected_shape(field)));
    }
    let lit = match (field.field_type, scalar) {
        (FieldType::Boolean, Scalar::Bool(b)) => Literal::Bool(*b),
        (FieldType::Integer, Scalar::Int(n)) => Literal::Int(*n),
        (FieldType::Float, Scalar::Int(n)) => Literal::Float(*n as f64),
        (FieldType::Float, Scalar::Float(n)) => Literal::Float(*n),
        (FieldType::Datetime, Scalar::Str(s)) => match parse_datetime(s) {
            Some(d) => Literal::DateTime(d),
            None => return Err(type_mismatch(cond, &expected_shape(field))),
        },
        (_, Scalar::Str(s)) => Literal::Text(s.clone()),
        _ => return Err(type_mismatch(cond, &expected_shape(field))),
    };
    Ok(lit)
}
