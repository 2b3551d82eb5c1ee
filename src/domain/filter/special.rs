//! Conditions on the collection membership array and the parent reference column

use uuid::Uuid;

use super::expression::ConditionSpec;
use super::operator::{FieldClass, Operator};
use super::params::{ParamAccumulator, SqlParam};
use super::standard::{comparison, empty_list_result, list_operand, null_check, scalar_operand};
use super::value::FilterValue;
use crate::domain::FilterError;

fn parse_uuid(field: &str, value: &FilterValue) -> Result<String, FilterError> {
    let raw = value.as_str().ok_or_else(|| {
        FilterError::invalid_uuid(field, value.to_text().unwrap_or_else(|| value.kind().to_string()))
    })?;
    Uuid::parse_str(raw)
        .map(|id| id.to_string())
        .map_err(|_| FilterError::invalid_uuid(field, raw))
}

fn parse_uuids(field: &str, values: &[FilterValue]) -> Result<Vec<String>, FilterError> {
    values.iter().map(|v| parse_uuid(field, v)).collect()
}

fn uuid_array(params: &mut ParamAccumulator, ids: Vec<String>) -> String {
    format!("ARRAY[{}]::uuid[]", params.add_all(ids))
}

/// Build a condition on the UUID-array collection membership column
///
/// A single id (bare or `$eq`) matches rows whose array contains it; a full
/// list under `$eq` / `$ne` compares the whole array.
pub fn build_collection_condition(
    field: &str,
    column: &str,
    spec: ConditionSpec<'_>,
    params: &mut ParamAccumulator,
) -> Result<String, FilterError> {
    let (operator, operand) = match spec {
        ConditionSpec::Literal(value) if !value.is_scalar() => (Operator::Overlap, value),
        ConditionSpec::Literal(value) => (Operator::Eq, value),
        ConditionSpec::Operator(operator, operand) => (operator, operand),
        ConditionSpec::Path(_) => {
            return Err(FilterError::invalid_format(format!(
                "nested conditions are not supported on '{}'",
                field
            )));
        }
    };

    match operator {
        Operator::Eq | Operator::Ne if operand.is_null() => Ok(null_check(column, operator)),
        Operator::Eq | Operator::Ne => match operand {
            FilterValue::List(items) => {
                let ids = parse_uuids(field, items)?;
                let array = if ids.is_empty() {
                    "'{}'::uuid[]".to_string()
                } else {
                    uuid_array(params, ids)
                };
                Ok(format!("{} {} {}", column, comparison(operator), array))
            }
            single => {
                let id = parse_uuid(field, single)?;
                let overlap = format!("{} && {}", column, uuid_array(params, vec![id]));
                if operator == Operator::Ne {
                    Ok(format!("NOT ({})", overlap))
                } else {
                    Ok(overlap)
                }
            }
        },
        Operator::In | Operator::Overlap | Operator::Nin => {
            let ids = parse_uuids(field, list_operand(field, operator, operand)?)?;
            if ids.is_empty() {
                return Ok(empty_list_result(operator).to_string());
            }
            let overlap = format!("{} && {}", column, uuid_array(params, ids));
            if operator == Operator::Nin {
                Ok(format!("NOT ({})", overlap))
            } else {
                Ok(overlap)
            }
        }
        Operator::Contains => {
            let ids = match operand {
                FilterValue::List(items) => parse_uuids(field, items)?,
                single => vec![parse_uuid(field, single)?],
            };
            if ids.is_empty() {
                return Ok(empty_list_result(operator).to_string());
            }
            Ok(format!("{} @> {}", column, uuid_array(params, ids)))
        }
        _ => Err(FilterError::unsupported_operator(
            field,
            operator.key(),
            FieldClass::ArrayMembership.as_str(),
        )),
    }
}

/// Build a condition on the scalar parent reference column
///
/// Values that are not UUIDs fall back to plain text comparison instead of
/// failing, so non-UUID identifiers keep working.
pub fn build_parent_condition(
    field: &str,
    column: &str,
    spec: ConditionSpec<'_>,
    params: &mut ParamAccumulator,
) -> Result<String, FilterError> {
    let (operator, operand) = match spec {
        ConditionSpec::Literal(value) if !value.is_scalar() => (Operator::In, value),
        ConditionSpec::Literal(value) => (Operator::Eq, value),
        ConditionSpec::Operator(operator, operand) => (operator, operand),
        ConditionSpec::Path(_) => {
            return Err(FilterError::invalid_format(format!(
                "nested conditions are not supported on '{}'",
                field
            )));
        }
    };

    match operator {
        Operator::Eq | Operator::Ne if operand.is_null() => Ok(null_check(column, operator)),
        Operator::Eq | Operator::Ne => {
            let symbol = comparison(operator);
            match operand.as_str().map(Uuid::parse_str) {
                Some(Ok(id)) => {
                    let placeholder = params.add(id.to_string());
                    Ok(format!("{} {} {}::uuid", column, symbol, placeholder))
                }
                _ => {
                    tracing::debug!(field = %field, "Parent reference is not a UUID, comparing as text");
                    let placeholder = params.add(scalar_operand(field, operator, operand)?);
                    Ok(format!("{} {} {}", column, symbol, placeholder))
                }
            }
        }
        Operator::In | Operator::Nin => {
            let items = list_operand(field, operator, operand)?;
            if items.is_empty() {
                return Ok(empty_list_result(operator).to_string());
            }

            let (values, cast) = match parse_uuids(field, items) {
                Ok(ids) => (ids, "uuid[]"),
                Err(_) => {
                    tracing::debug!(field = %field, "Parent references are not all UUIDs, comparing as text");
                    let texts = items
                        .iter()
                        .map(|item| {
                            scalar_operand(field, operator, item)?;
                            item.to_text().ok_or_else(|| {
                                FilterError::invalid_operand(
                                    field,
                                    operator.key(),
                                    "expected scalar list elements",
                                )
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    (texts, "text[]")
                }
            };

            let placeholder = params.add(SqlParam::TextArray(values));
            if operator == Operator::Nin {
                Ok(format!("{} != ALL({}::{})", column, placeholder, cast))
            } else {
                Ok(format!("{} = ANY({}::{})", column, placeholder, cast))
            }
        }
        _ => Err(FilterError::unsupported_operator(
            field,
            operator.key(),
            FieldClass::HierarchicalReference.as_str(),
        )),
    }
}
