//! Conditions on paths inside the JSON metadata column
//!
//! `a.b.c` is addressed as `metadata->'a'->'b'->>'c'` when compared as text
//! and `metadata->'a'->'b'->'c'` when compared as JSON.

use super::compiler::{CompilerConfig, MetadataInStrategy};
use super::expression::ConditionSpec;
use super::operator::{FieldClass, Operator};
use super::params::{ParamAccumulator, SqlParam};
use super::standard::{
    comparison, empty_list_result, list_operand, pattern_keyword, pattern_operand,
    scalar_operand,
};
use super::value::FilterValue;
use super::walker::combine_and;
use crate::domain::FilterError;

fn quote_segment(segment: &str) -> String {
    format!("'{}'", segment.replace('\'', "''"))
}

/// JSON-typed accessor (`->` all the way down)
pub fn json_accessor(column: &str, path: &[String]) -> String {
    path.iter().fold(column.to_string(), |acc, segment| {
        format!("{}->{}", acc, quote_segment(segment))
    })
}

/// Text accessor (`->` for intermediate segments, `->>` for the last)
pub fn text_accessor(column: &str, path: &[String]) -> String {
    match path.split_last() {
        None => format!("{}::text", column),
        Some((last, parents)) => format!(
            "{}->>{}",
            json_accessor(column, parents),
            quote_segment(last)
        ),
    }
}

fn json_param(field: &str, value: &FilterValue) -> Result<SqlParam, FilterError> {
    value
        .to_json()
        .map(|json| SqlParam::Json(json.to_string()))
        .map_err(|message| FilterError::not_serializable(field, message))
}

fn join_path(path: &[String]) -> String {
    path.join(".")
}

/// Build a condition on a JSON metadata path
pub fn build_metadata_condition(
    column: &str,
    path: &[String],
    spec: ConditionSpec<'_>,
    params: &mut ParamAccumulator,
    config: &CompilerConfig,
    depth: usize,
) -> Result<String, FilterError> {
    let field = join_path(path);
    let field = if field.is_empty() { column } else { field.as_str() };

    let (operator, operand) = match spec {
        ConditionSpec::Literal(value) if !value.is_scalar() => (Operator::In, value),
        ConditionSpec::Literal(value) => (Operator::Eq, value),
        ConditionSpec::Operator(operator, operand) => (operator, operand),
        ConditionSpec::Path(entries) => {
            if depth >= config.max_depth {
                return Err(FilterError::max_depth_exceeded(config.max_depth));
            }
            let mut clauses = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                let mut child_path = path.to_vec();
                for segment in key.split('.') {
                    if segment.is_empty() {
                        return Err(FilterError::invalid_field(format!("{}.{}", field, key)));
                    }
                    child_path.push(segment.to_string());
                }
                let child_spec = ConditionSpec::parse(&join_path(&child_path), value)?;
                clauses.push(build_metadata_condition(
                    column,
                    &child_path,
                    child_spec,
                    params,
                    config,
                    depth + 1,
                )?);
            }
            return Ok(combine_and(clauses));
        }
    };

    match operator {
        Operator::Eq | Operator::Ne if operand.is_null() => {
            let accessor = json_accessor(column, path);
            if operator == Operator::Ne {
                Ok(format!(
                    "({} IS NULL OR {} != 'null'::jsonb)",
                    accessor, accessor
                ))
            } else {
                Ok(format!(
                    "({} IS NOT NULL AND {} = 'null'::jsonb)",
                    accessor, accessor
                ))
            }
        }
        Operator::Eq | Operator::Ne if !operand.is_scalar() => {
            let placeholder = params.add(json_param(field, operand)?);
            Ok(format!(
                "{} {} {}::jsonb",
                json_accessor(column, path),
                comparison(operator),
                placeholder
            ))
        }
        Operator::Eq
        | Operator::Ne
        | Operator::Lt
        | Operator::Lte
        | Operator::Gt
        | Operator::Gte => {
            let param = scalar_operand(field, operator, operand)?;
            let accessor = text_accessor(column, path);
            let accessor = match operand {
                FilterValue::Boolean(_) => format!("({})::boolean", accessor),
                _ if operand.is_numeric() => format!("({})::numeric", accessor),
                _ => accessor,
            };
            let placeholder = params.add(param);
            Ok(format!("{} {} {}", accessor, comparison(operator), placeholder))
        }
        Operator::Like | Operator::ILike => {
            let pattern = pattern_operand(field, operator, operand, config.like_auto_wildcard)?;
            let placeholder = params.add(pattern);
            Ok(format!(
                "{} {} {}",
                text_accessor(column, path),
                pattern_keyword(operator),
                placeholder
            ))
        }
        Operator::In | Operator::Nin => {
            let items = list_operand(field, operator, operand)?;
            if items.is_empty() {
                return Ok(empty_list_result(operator).to_string());
            }
            match config.metadata_in {
                MetadataInStrategy::PlaceholderList => {
                    let texts = items
                        .iter()
                        .map(|item| {
                            scalar_operand(field, operator, item)?;
                            item.to_text().ok_or_else(|| {
                                FilterError::invalid_operand(
                                    field,
                                    operator.key(),
                                    format!("expected a scalar, got {}", item.kind()),
                                )
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    let placeholders = params.add_all(texts);
                    let keyword = if operator == Operator::In { "IN" } else { "NOT IN" };
                    Ok(format!(
                        "({}) {} ({})",
                        text_accessor(column, path),
                        keyword,
                        placeholders
                    ))
                }
                MetadataInStrategy::JsonArrayElements => {
                    let placeholder = params.add(json_param(field, operand)?);
                    let membership = format!(
                        "{} = ANY(SELECT jsonb_array_elements({}::jsonb))",
                        json_accessor(column, path),
                        placeholder
                    );
                    if operator == Operator::Nin {
                        Ok(format!("NOT ({})", membership))
                    } else {
                        Ok(membership)
                    }
                }
            }
        }
        Operator::Contains => {
            let placeholder = params.add(json_param(field, operand)?);
            Ok(format!(
                "{} @> {}::jsonb",
                json_accessor(column, path),
                placeholder
            ))
        }
        _ => Err(FilterError::unsupported_operator(
            field,
            operator.key(),
            FieldClass::MetadataPath.as_str(),
        )),
    }
}
