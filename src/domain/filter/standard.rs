//! Conditions on plain (non-JSON) columns

use super::compiler::CompilerConfig;
use super::expression::ConditionSpec;
use super::operator::{FieldClass, Operator};
use super::params::{ParamAccumulator, SqlParam};
use super::value::FilterValue;
use crate::domain::FilterError;

pub(crate) const SQL_TRUE: &str = "TRUE";
pub(crate) const SQL_FALSE: &str = "FALSE";

/// Build a condition on a literal column
pub fn build_standard_condition(
    field: &str,
    column: &str,
    spec: ConditionSpec<'_>,
    params: &mut ParamAccumulator,
    config: &CompilerConfig,
) -> Result<String, FilterError> {
    let (operator, operand) = match spec {
        ConditionSpec::Literal(value) if !value.is_scalar() => (Operator::In, value),
        ConditionSpec::Literal(value) => (Operator::Eq, value),
        ConditionSpec::Operator(operator, operand) => (operator, operand),
        ConditionSpec::Path(_) => {
            return Err(FilterError::invalid_format(format!(
                "nested conditions are only supported on metadata fields, not '{}'",
                field
            )));
        }
    };

    match operator {
        Operator::Eq | Operator::Ne if operand.is_null() => Ok(null_check(column, operator)),
        Operator::Eq
        | Operator::Ne
        | Operator::Lt
        | Operator::Lte
        | Operator::Gt
        | Operator::Gte => {
            let param = scalar_operand(field, operator, operand)?;
            let placeholder = params.add(param);
            Ok(format!(
                "{} {} {}",
                column,
                comparison(operator),
                placeholder
            ))
        }
        Operator::Like | Operator::ILike => {
            let pattern = pattern_operand(field, operator, operand, config.like_auto_wildcard)?;
            let placeholder = params.add(pattern);
            Ok(format!("{} {} {}", column, pattern_keyword(operator), placeholder))
        }
        Operator::In | Operator::Nin => {
            let items = list_operand(field, operator, operand)?;
            if items.is_empty() {
                return Ok(empty_list_result(operator).to_string());
            }
            let values = items
                .iter()
                .map(|item| scalar_operand(field, operator, item))
                .collect::<Result<Vec<_>, _>>()?;
            let placeholders = params.add_all(values);
            let keyword = if operator == Operator::In { "IN" } else { "NOT IN" };
            Ok(format!("{} {} ({})", column, keyword, placeholders))
        }
        _ => Err(FilterError::unsupported_operator(
            field,
            operator.key(),
            FieldClass::StandardColumn.as_str(),
        )),
    }
}

/// `IS NULL` / `IS NOT NULL` for an `$eq` / `$ne` null operand
pub(crate) fn null_check(column: &str, operator: Operator) -> String {
    if operator == Operator::Ne {
        format!("{} IS NOT NULL", column)
    } else {
        format!("{} IS NULL", column)
    }
}

pub(crate) fn comparison(operator: Operator) -> &'static str {
    operator.comparison_sql().unwrap_or("=")
}

pub(crate) fn pattern_keyword(operator: Operator) -> &'static str {
    operator.pattern_sql().unwrap_or("LIKE")
}

/// Literal result of a list operator applied to an empty list
pub(crate) fn empty_list_result(operator: Operator) -> &'static str {
    match operator {
        Operator::Nin | Operator::Contains => SQL_TRUE,
        _ => SQL_FALSE,
    }
}

/// Non-null scalar operand bound as-is
pub(crate) fn scalar_operand(
    field: &str,
    operator: Operator,
    operand: &FilterValue,
) -> Result<SqlParam, FilterError> {
    if operand.is_null() {
        return Err(FilterError::invalid_operand(
            field,
            operator.key(),
            "null is only supported with $eq and $ne",
        ));
    }
    SqlParam::scalar(operand).ok_or_else(|| {
        FilterError::invalid_operand(
            field,
            operator.key(),
            format!("expected a scalar, got {}", operand.kind()),
        )
    })
}

/// `$like` / `$ilike` operand; wrapped in `%` only when auto-wildcarding is on
pub(crate) fn pattern_operand(
    field: &str,
    operator: Operator,
    operand: &FilterValue,
    auto_wildcard: bool,
) -> Result<String, FilterError> {
    let pattern = operand.as_str().ok_or_else(|| {
        FilterError::invalid_operand(
            field,
            operator.key(),
            format!("expected a string, got {}", operand.kind()),
        )
    })?;

    if auto_wildcard && !pattern.contains('%') {
        Ok(format!("%{}%", pattern))
    } else {
        Ok(pattern.to_string())
    }
}

pub(crate) fn list_operand<'v>(
    field: &str,
    operator: Operator,
    operand: &'v FilterValue,
) -> Result<&'v [FilterValue], FilterError> {
    operand.as_list().ok_or_else(|| {
        FilterError::invalid_operand(
            field,
            operator.key(),
            format!("expected a list, got {}", operand.kind()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(value: serde_json::Value) -> Result<(String, Vec<SqlParam>), FilterError> {
        build_with(value, &CompilerConfig::default())
    }

    fn build_with(
        value: serde_json::Value,
        config: &CompilerConfig,
    ) -> Result<(String, Vec<SqlParam>), FilterError> {
        let value = FilterValue::from(value);
        let spec = ConditionSpec::parse("status", &value)?;
        let mut params = ParamAccumulator::new(Vec::new());
        let sql = build_standard_condition("status", "status", spec, &mut params, config)?;
        Ok((sql, params.into_params()))
    }

    #[test]
    fn test_equality_shorthand() {
        let (sql, params) = build(json!("active")).unwrap();
        assert_eq!(sql, "status = $1");
        assert_eq!(params, vec![SqlParam::from("active")]);
    }

    #[test]
    fn test_comparisons() {
        let cases = [
            ("$ne", "!="),
            ("$lt", "<"),
            ("$lte", "<="),
            ("$gt", ">"),
            ("$gte", ">="),
        ];
        for (key, symbol) in cases {
            let (sql, params) = build(json!({ key: 10 })).unwrap();
            assert_eq!(sql, format!("status {} $1", symbol));
            assert_eq!(params, vec![SqlParam::Integer(10)]);
        }
    }

    #[test]
    fn test_null_checks() {
        let (sql, params) = build(json!(null)).unwrap();
        assert_eq!(sql, "status IS NULL");
        assert!(params.is_empty());

        let (sql, params) = build(json!({"$ne": null})).unwrap();
        assert_eq!(sql, "status IS NOT NULL");
        assert!(params.is_empty());

        assert!(build(json!({"$gt": null})).is_err());
    }

    #[test]
    fn test_like_uses_operand_verbatim() {
        let (sql, params) = build(json!({"$like": "act"})).unwrap();
        assert_eq!(sql, "status LIKE $1");
        assert_eq!(params, vec![SqlParam::from("act")]);

        let (sql, _) = build(json!({"$ilike": "%ACT%"})).unwrap();
        assert_eq!(sql, "status ILIKE $1");
    }

    #[test]
    fn test_like_auto_wildcard() {
        let config = CompilerConfig {
            like_auto_wildcard: true,
            ..CompilerConfig::default()
        };
        let (_, params) = build_with(json!({"$like": "act"}), &config).unwrap();
        assert_eq!(params, vec![SqlParam::from("%act%")]);

        let (_, params) = build_with(json!({"$like": "act%"}), &config).unwrap();
        assert_eq!(params, vec![SqlParam::from("act%")]);
    }

    #[test]
    fn test_like_requires_string() {
        assert!(matches!(
            build(json!({"$like": 5})),
            Err(FilterError::InvalidOperand { .. })
        ));
    }

    #[test]
    fn test_in_and_nin() {
        let (sql, params) = build(json!({"$in": ["a", "b"]})).unwrap();
        assert_eq!(sql, "status IN ($1, $2)");
        assert_eq!(params, vec![SqlParam::from("a"), SqlParam::from("b")]);

        let (sql, _) = build(json!({"$nin": ["a"]})).unwrap();
        assert_eq!(sql, "status NOT IN ($1)");

        let (sql, params) = build(json!(["x", "y"])).unwrap();
        assert_eq!(sql, "status IN ($1, $2)");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_empty_lists() {
        let (sql, params) = build(json!({"$in": []})).unwrap();
        assert_eq!(sql, "FALSE");
        assert!(params.is_empty());

        let (sql, params) = build(json!({"$nin": []})).unwrap();
        assert_eq!(sql, "TRUE");
        assert!(params.is_empty());
    }

    #[test]
    fn test_invalid_operands() {
        assert!(build(json!({"$in": "a"})).is_err());
        assert!(build(json!({"$in": [null]})).is_err());
        assert!(build(json!({"$eq": ["a"]})).is_err());
        assert!(build(json!({"nested": 1})).is_err());
    }

    #[test]
    fn test_unsupported_operator() {
        assert!(matches!(
            build(json!({"$overlap": ["a"]})),
            Err(FilterError::UnsupportedOperator { .. })
        ));
        assert!(matches!(
            build(json!({"$contains": "a"})),
            Err(FilterError::UnsupportedOperator { .. })
        ));
    }
}
