//! Structural and type-level checks of a condition tree against a field registry.
//! Never touches the store; the first error aborts.

use crate::error::QueryError;
use crate::query::model::{QueryCondition, QueryGroup, QueryNode, QueryRequest, QueryValue, Scalar};
use crate::query::predicate::parse_datetime;
use crate::registry::{FieldConfig, FieldRegistry, FieldType, Operator};

pub fn validate(node: &QueryNode, registry: &FieldRegistry) -> Result<(), QueryError> {
    match node {
        QueryNode::Condition(cond) => validate_condition(cond, registry),
        QueryNode::Group(group) => validate_group(group, registry),
    }
}

/// Pagination bounds, then the tree if present.
pub fn validate_request(
    request: &QueryRequest,
    registry: &FieldRegistry,
) -> Result<(), QueryError> {
    let p = request.pagination;
    if !p.is_valid() {
        return Err(QueryError::InvalidPagination {
            page: p.page,
            page_size: p.page_size,
        });
    }
    match &request.query {
        Some(node) => validate(node, registry),
        None => Ok(()),
    }
}

fn validate_group(group: &QueryGroup, registry: &FieldRegistry) -> Result<(), QueryError> {
    if group.conditions.is_empty() {
        return Err(QueryError::EmptyGroup {
            operator: group.operator,
        });
    }
    group
        .conditions
        .iter()
        .try_for_each(|child| validate(child, registry))
}

fn validate_condition(cond: &QueryCondition, registry: &FieldRegistry) -> Result<(), QueryError> {
    let field = registry.get(&cond.field)?;
    let op = parse_operator(cond)?;
    if !field.allows(op) {
        return Err(unsupported_operator(cond));
    }
    check_value_shape(cond, field)?;
    if cond.value.is_list() && !field.is_multi_select {
        return Err(QueryError::MultiValueNotAllowed {
            field: cond.field.clone(),
            operator: cond.operator.clone(),
        });
    }
    check_arity(cond, op)
}

pub(crate) fn parse_operator(cond: &QueryCondition) -> Result<Operator, QueryError> {
    cond.operator.parse().map_err(|_| unsupported_operator(cond))
}

fn unsupported_operator(cond: &QueryCondition) -> QueryError {
    QueryError::UnsupportedOperator {
        field: cond.field.clone(),
        operator: cond.operator.clone(),
    }
}

fn check_value_shape(cond: &QueryCondition, field: &FieldConfig) -> Result<(), QueryError> {
    if let QueryValue::Other(_) = cond.value {
        return Err(type_mismatch(cond, &expected_shape(field)));
    }
    if field.field_type == FieldType::Boolean && cond.value.is_list() {
        return Err(type_mismatch(cond, "a boolean"));
    }
    for scalar in cond.value.scalars() {
        if !scalar_fits(field, scalar) {
            return Err(type_mismatch(cond, &expected_shape(field)));
        }
    }
    Ok(())
}

/// Whether one literal is a legal value for the field's declared type.
pub(crate) fn scalar_fits(field: &FieldConfig, scalar: &Scalar) -> bool {
    match (field.field_type, scalar) {
        (FieldType::String, Scalar::Str(_)) => true,
        (FieldType::Integer, Scalar::Int(_)) => true,
        (FieldType::Float, Scalar::Int(_) | Scalar::Float(_)) => true,
        (FieldType::Boolean, Scalar::Bool(_)) => true,
        (FieldType::Datetime, Scalar::Str(s)) => parse_datetime(s).is_some(),
        (FieldType::Enum | FieldType::MultiSelect, Scalar::Str(s)) => field.allows_literal(s),
        _ => false,
    }
}

pub(crate) fn expected_shape(field: &FieldConfig) -> String {
    match field.field_type {
        FieldType::String => "a string".into(),
        FieldType::Integer => "an integer".into(),
        FieldType::Float => "a number".into(),
        FieldType::Boolean => "a boolean".into(),
        FieldType::Datetime => "an ISO-8601 date or datetime string".into(),
        FieldType::Enum | FieldType::MultiSelect => format!(
            "one of {:?}",
            field.enum_values.as_deref().unwrap_or_default()
        ),
    }
}

fn check_arity(cond: &QueryCondition, op: Operator) -> Result<(), QueryError> {
    match (op, &cond.value) {
        (Operator::In, QueryValue::One(_)) => Err(type_mismatch(cond, "a list")),
        (Operator::In, QueryValue::Many(_)) => Ok(()),
        (_, QueryValue::Many(_)) => Err(type_mismatch(cond, "a single value")),
        (_, QueryValue::One(_)) => Ok(()),
        (_, QueryValue::Other(_)) => Err(type_mismatch(cond, "a single value or a list")),
    }
}

pub(crate) fn type_mismatch(cond: &QueryCondition, expected: &str) -> QueryError {
    QueryError::TypeMismatch {
        field: cond.field.clone(),
        operator: cond.operator.clone(),
        expected: expected.to_string(),
        value: cond.value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::model::{GroupOperator, Pagination};
    use crate::registry::{EntityTable, RegistryCatalog, SqlType};

    /// One multi-select field per type with every operator the type supports,
    /// plus `single_<type>` twins that reject list values.
    fn fixture() -> FieldRegistry {
        let mut table = EntityTable::new("fixture", "fixture", "id").column("id", SqlType::BigInt);
        for ty in FieldType::ALL {
            table = table
                .column(&format!("f_{}", ty), SqlType::Text)
                .column(&format!("single_{}", ty), SqlType::Text);
        }
        let mut reg = FieldRegistry::new("fixture");
        for ty in FieldType::ALL {
            for (name, multi) in [(format!("f_{}", ty), true), (format!("single_{}", ty), false)] {
                let mut cfg = FieldConfig::new(name.clone(), ty, "");
                if matches!(ty, FieldType::Enum | FieldType::MultiSelect) {
                    cfg = cfg.enum_values(&["red", "green"]);
                }
                if multi {
                    cfg = cfg.multi_select();
                }
                reg.register(&table, &name, cfg).unwrap();
            }
        }
        reg
    }

    fn good_scalar(ty: FieldType) -> Scalar {
        match ty {
            FieldType::String => Scalar::Str("abc".into()),
            FieldType::Integer => Scalar::Int(7),
            FieldType::Float => Scalar::Float(2.5),
            FieldType::Boolean => Scalar::Bool(true),
            FieldType::Datetime => Scalar::Str("2024-01-31T12:00:00".into()),
            FieldType::Enum | FieldType::MultiSelect => Scalar::Str("green".into()),
        }
    }

    fn bad_scalar(ty: FieldType) -> Scalar {
        match ty {
            FieldType::String => Scalar::Int(1),
            FieldType::Integer => Scalar::Str("7".into()),
            FieldType::Float => Scalar::Str("2.5".into()),
            FieldType::Boolean => Scalar::Str("true".into()),
            FieldType::Datetime => Scalar::Str("last tuesday".into()),
            FieldType::Enum | FieldType::MultiSelect => Scalar::Str("blue".into()),
        }
    }

    fn consistent_value(ty: FieldType, op: Operator) -> QueryValue {
        if op == Operator::In {
            QueryValue::Many(vec![good_scalar(ty), good_scalar(ty)])
        } else {
            QueryValue::One(good_scalar(ty))
        }
    }

    fn cond(field: &str, op: &str, value: QueryValue) -> QueryNode {
        QueryNode::condition(field, op, value)
    }

    #[test]
    fn type_operator_matrix() {
        let reg = fixture();
        for ty in FieldType::ALL {
            let field = format!("f_{}", ty);
            for op in Operator::ALL {
                let node = cond(&field, op.token(), consistent_value(ty, op));
                let res = validate(&node, &reg);
                if ty.supports(op) {
                    assert_eq!(res, Ok(()), "{} {} should be accepted", ty, op);
                } else {
                    assert!(
                        matches!(res, Err(QueryError::UnsupportedOperator { .. })),
                        "{} {} should be rejected, got {:?}",
                        ty,
                        op,
                        res
                    );
                }
            }
        }
    }

    #[test]
    fn inconsistent_values_are_type_mismatches() {
        let reg = fixture();
        for ty in FieldType::ALL {
            let field = format!("f_{}", ty);
            for op in Operator::ALL.into_iter().filter(|op| ty.supports(*op)) {
                let value = if op == Operator::In {
                    QueryValue::Many(vec![good_scalar(ty), bad_scalar(ty)])
                } else {
                    QueryValue::One(bad_scalar(ty))
                };
                let res = validate(&cond(&field, op.token(), value), &reg);
                assert!(
                    matches!(&res, Err(QueryError::TypeMismatch { field: f, .. }) if *f == field),
                    "{} {} with bad value, got {:?}",
                    ty,
                    op,
                    res
                );
            }
        }
    }

    #[test]
    fn arity_follows_operator() {
        let reg = fixture();
        let scalar_in = cond("f_integer", "in", QueryValue::One(Scalar::Int(1)));
        assert!(matches!(validate(&scalar_in, &reg), Err(QueryError::TypeMismatch { .. })));
        let list_eq = cond("f_integer", "=", QueryValue::Many(vec![Scalar::Int(1)]));
        assert!(matches!(validate(&list_eq, &reg), Err(QueryError::TypeMismatch { .. })));
        let bool_list = cond("f_boolean", "=", QueryValue::Many(vec![Scalar::Bool(true)]));
        assert!(matches!(validate(&bool_list, &reg), Err(QueryError::TypeMismatch { .. })));
    }

    #[test]
    fn non_scalar_values_name_the_field() {
        let reg = fixture();
        for (field, op) in [("f_string", "="), ("f_integer", "in"), ("f_boolean", "!=")] {
            for raw in [serde_json::Value::Null, serde_json::json!({ "eq": 1 })] {
                let res = validate(&cond(field, op, QueryValue::Other(raw.clone())), &reg);
                assert!(
                    matches!(&res, Err(QueryError::TypeMismatch { field: f, operator: o, .. })
                        if f == field && o == op),
                    "{} {} {}: {:?}",
                    field,
                    op,
                    raw,
                    res
                );
            }
        }
    }

    /// Every shipped field accepts exactly its declared operators with a well-typed value.
    #[test]
    fn registered_fields_accept_exactly_their_operators() {
        let catalog = RegistryCatalog::with_defaults().unwrap();
        for entity in catalog.entity_names() {
            let reg = catalog.fields(entity).unwrap();
            for (name, cfg) in reg.all_fields() {
                let sample = match cfg.field_type {
                    FieldType::Enum | FieldType::MultiSelect => {
                        let first = cfg.enum_values.as_ref().and_then(|v| v.first()).unwrap();
                        Scalar::Str(first.clone())
                    }
                    ty => good_scalar(ty),
                };
                for op in Operator::ALL {
                    let value = if op == Operator::In {
                        QueryValue::Many(vec![sample.clone()])
                    } else {
                        QueryValue::One(sample.clone())
                    };
                    let res = validate(&cond(name, op.token(), value), reg);
                    let expected = if !cfg.allows(op) {
                        Err(QueryError::UnsupportedOperator {
                            field: name.clone(),
                            operator: op.token().into(),
                        })
                    } else if op == Operator::In && !cfg.is_multi_select {
                        Err(QueryError::MultiValueNotAllowed {
                            field: name.clone(),
                            operator: op.token().into(),
                        })
                    } else {
                        Ok(())
                    };
                    assert_eq!(res, expected, "{}.{} {}", entity, name, op);
                }
            }
        }
    }

    #[test]
    fn float_fields_accept_integers() {
        let reg = fixture();
        assert_eq!(validate(&cond("f_float", ">", 3i64.into()), &reg), Ok(()));
    }

    #[test]
    fn list_on_single_valued_field() {
        let reg = fixture();
        for ty in [FieldType::String, FieldType::Integer, FieldType::Float, FieldType::Enum] {
            let field = format!("single_{}", ty);
            let res = validate(&cond(&field, "in", consistent_value(ty, Operator::In)), &reg);
            assert_eq!(
                res,
                Err(QueryError::MultiValueNotAllowed {
                    field,
                    operator: "in".into()
                })
            );
        }
    }

    #[test]
    fn empty_in_list_is_valid() {
        let reg = fixture();
        assert_eq!(validate(&cond("f_integer", "in", QueryValue::Many(vec![])), &reg), Ok(()));
    }

    #[test]
    fn unknown_field_and_operator() {
        let reg = fixture();
        assert_eq!(
            validate(&cond("rack", "=", "a".into()), &reg),
            Err(QueryError::UnknownField { field: "rack".into() })
        );
        assert_eq!(
            validate(&cond("f_string", "~=", "a".into()), &reg),
            Err(QueryError::UnsupportedOperator {
                field: "f_string".into(),
                operator: "~=".into()
            })
        );
    }

    #[test]
    fn empty_groups_always_fail() {
        let reg = fixture();
        for op in [GroupOperator::And, GroupOperator::Or] {
            let empty = QueryNode::Group(QueryGroup {
                operator: op,
                conditions: vec![],
            });
            assert_eq!(validate(&empty, &reg), Err(QueryError::EmptyGroup { operator: op }));

            let nested = QueryNode::and(vec![cond("f_string", "=", "a".into()), empty]);
            assert_eq!(validate(&nested, &reg), Err(QueryError::EmptyGroup { operator: op }));
        }
    }

    #[test]
    fn first_error_wins() {
        let reg = fixture();
        let tree = QueryNode::or(vec![
            cond("f_string", "=", "a".into()),
            cond("nope", "=", "a".into()),
            cond("f_boolean", ">", true.into()),
        ]);
        assert_eq!(
            validate(&tree, &reg),
            Err(QueryError::UnknownField { field: "nope".into() })
        );
    }

    #[test]
    fn request_pagination() {
        let reg = fixture();
        let mut req = QueryRequest::default();
        assert_eq!(validate_request(&req, &reg), Ok(()));
        req.pagination = Pagination::new(1, 1001);
        assert_eq!(
            validate_request(&req, &reg),
            Err(QueryError::InvalidPagination { page: 1, page_size: 1001 })
        );
    }
}
