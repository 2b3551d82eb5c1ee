//! Recursive walk over filter expressions
//!
//! `$and` / `$or` groups are rendered first, then field conditions, each in
//! insertion order. Sibling fragments are joined with an implicit AND.

use super::classifier::FieldClassifier;
use super::compiler::CompilerConfig;
use super::expression::{ConditionSpec, FilterExpression};
use super::metadata::build_metadata_condition;
use super::operator::{is_operator_key, FieldClass, Operator};
use super::params::ParamAccumulator;
use super::special::{build_collection_condition, build_parent_condition};
use super::standard::{build_standard_condition, SQL_FALSE, SQL_TRUE};
use super::value::FilterValue;
use crate::domain::FilterError;

/// Join fragments with AND, parenthesising each only when there are several
pub(crate) fn combine_and(clauses: Vec<String>) -> String {
    match clauses.len() {
        0 => SQL_TRUE.to_string(),
        1 => clauses.into_iter().next().unwrap_or_default(),
        _ => clauses
            .iter()
            .map(|clause| format!("({})", clause))
            .collect::<Vec<_>>()
            .join(" AND "),
    }
}

pub struct FilterWalker<'a> {
    config: &'a CompilerConfig,
    classifier: FieldClassifier<'a>,
}

impl<'a> FilterWalker<'a> {
    pub fn new(config: &'a CompilerConfig) -> Self {
        Self {
            config,
            classifier: FieldClassifier::new(&config.top_level_columns, &config.json_column),
        }
    }

    /// Render `expr` as a boolean condition, allocating placeholders from `params`
    pub fn walk(
        &self,
        expr: &FilterExpression,
        params: &mut ParamAccumulator,
    ) -> Result<String, FilterError> {
        self.walk_entries(expr.entries(), params, 0)
    }

    fn walk_entries(
        &self,
        entries: &[(String, FilterValue)],
        params: &mut ParamAccumulator,
        depth: usize,
    ) -> Result<String, FilterError> {
        if entries.is_empty() {
            return Ok(SQL_TRUE.to_string());
        }

        let (logical, fields): (Vec<_>, Vec<_>) =
            entries.iter().partition(|(key, _)| is_operator_key(key));

        let mut clauses = Vec::with_capacity(entries.len());
        for (key, value) in logical {
            let operator = match Operator::from_key(key) {
                Some(op) if op.is_logical() => op,
                Some(_) => {
                    return Err(FilterError::invalid_format(format!(
                        "operator '{}' must be applied to a field",
                        key
                    )));
                }
                None => return Err(FilterError::unknown_operator("", key)),
            };
            clauses.push(self.walk_group(operator, value, params, depth)?);
        }

        for (key, value) in fields {
            clauses.push(self.walk_field(key, value, params, depth)?);
        }

        Ok(combine_and(clauses))
    }

    fn walk_group(
        &self,
        operator: Operator,
        value: &FilterValue,
        params: &mut ParamAccumulator,
        depth: usize,
    ) -> Result<String, FilterError> {
        if depth >= self.config.max_depth {
            return Err(FilterError::max_depth_exceeded(self.config.max_depth));
        }

        let FilterValue::List(items) = value else {
            return Err(FilterError::logical_operand_not_list(operator.key()));
        };

        if items.is_empty() {
            let empty = if operator == Operator::Or { SQL_FALSE } else { SQL_TRUE };
            return Ok(empty.to_string());
        }

        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            let FilterValue::Object(entries) = item else {
                return Err(FilterError::invalid_format(format!(
                    "elements of '{}' must be objects, got {}",
                    operator.key(),
                    item.kind()
                )));
            };
            let sub = self.walk_entries(entries, params, depth + 1)?;
            parts.push(format!("({})", sub));
        }

        let joiner = if operator == Operator::Or { " OR " } else { " AND " };
        Ok(parts.join(joiner))
    }

    fn walk_field(
        &self,
        key: &str,
        value: &FilterValue,
        params: &mut ParamAccumulator,
        depth: usize,
    ) -> Result<String, FilterError> {
        let field = self.classifier.classify(key)?;
        let spec = ConditionSpec::parse(key, value)?;

        match field.class {
            FieldClass::StandardColumn => {
                build_standard_condition(key, &field.column, spec, params, self.config)
            }
            FieldClass::ArrayMembership => {
                build_collection_condition(key, &field.column, spec, params)
            }
            FieldClass::HierarchicalReference => {
                build_parent_condition(key, &field.column, spec, params)
            }
            FieldClass::MetadataPath => build_metadata_condition(
                &field.column,
                &field.path,
                spec,
                params,
                self.config,
                depth,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::SqlParam;
    use serde_json::json;

    fn walk(value: serde_json::Value) -> Result<(String, Vec<SqlParam>), FilterError> {
        walk_with(value, &CompilerConfig::default())
    }

    fn walk_with(
        value: serde_json::Value,
        config: &CompilerConfig,
    ) -> Result<(String, Vec<SqlParam>), FilterError> {
        let expr = FilterExpression::from_json(value)?;
        let mut params = ParamAccumulator::new(Vec::new());
        let sql = FilterWalker::new(config).walk(&expr, &mut params)?;
        Ok((sql, params.into_params()))
    }

    #[test]
    fn test_combine_and() {
        assert_eq!(combine_and(vec![]), "TRUE");
        assert_eq!(combine_and(vec!["a = $1".to_string()]), "a = $1");
        assert_eq!(
            combine_and(vec!["a = $1".to_string(), "b = $2".to_string()]),
            "(a = $1) AND (b = $2)"
        );
    }

    #[test]
    fn test_empty_expression() {
        assert_eq!(walk(json!({})).unwrap(), ("TRUE".to_string(), vec![]));
    }

    #[test]
    fn test_logical_and() {
        let (sql, params) = walk(json!({"$and": [{"id": "abc"}, {"status": "active"}]})).unwrap();
        assert_eq!(sql, "(id = $1) AND (status = $2)");
        assert_eq!(params, vec![SqlParam::from("abc"), SqlParam::from("active")]);
    }

    #[test]
    fn test_logical_or_nested() {
        let (sql, params) = walk(json!({
            "$or": [
                {"status": "draft"},
                {"$and": [{"score": {"$gte": 10}}, {"owner_id": null}]}
            ]
        }))
        .unwrap();
        assert_eq!(
            sql,
            "(status = $1) OR (((metadata->>'score')::numeric >= $2) AND (owner_id IS NULL))"
        );
        assert_eq!(params, vec![SqlParam::from("draft"), SqlParam::Integer(10)]);
    }

    #[test]
    fn test_empty_groups() {
        assert_eq!(walk(json!({"$and": []})).unwrap().0, "TRUE");
        assert_eq!(walk(json!({"$or": []})).unwrap().0, "FALSE");
    }

    #[test]
    fn test_implicit_and_puts_groups_first() {
        let (sql, params) = walk(json!({
            "status": "active",
            "$or": [{"type": "pdf"}, {"type": "txt"}]
        }))
        .unwrap();
        assert_eq!(
            sql,
            "((type = $1) OR (type = $2)) AND (status = $3)"
        );
        assert_eq!(
            params,
            vec![SqlParam::from("pdf"), SqlParam::from("txt"), SqlParam::from("active")]
        );
    }

    #[test]
    fn test_field_order_preserved() {
        let (sql, _) = walk(json!({"status": "a", "id": "b", "title": "c"})).unwrap();
        assert_eq!(sql, "(status = $1) AND (id = $2) AND (title = $3)");
    }

    #[test]
    fn test_logical_operand_must_be_list() {
        assert!(matches!(
            walk(json!({"$and": {"id": "x"}})),
            Err(FilterError::LogicalOperandNotList { .. })
        ));
    }

    #[test]
    fn test_logical_elements_must_be_objects() {
        assert!(matches!(
            walk(json!({"$or": ["id"]})),
            Err(FilterError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_operators_outside_fields() {
        assert!(matches!(
            walk(json!({"$eq": 1})),
            Err(FilterError::InvalidFormat { .. })
        ));
        assert!(matches!(
            walk(json!({"$not": []})),
            Err(FilterError::UnknownOperator { .. })
        ));
    }

    #[test]
    fn test_depth_limit() {
        let config = CompilerConfig {
            max_depth: 2,
            ..CompilerConfig::default()
        };
        assert!(walk_with(json!({"$and": [{"$or": [{"id": "x"}]}]}), &config).is_ok());
        assert!(matches!(
            walk_with(
                json!({"$and": [{"$or": [{"$and": [{"id": "x"}]}]}]}),
                &config
            ),
            Err(FilterError::MaxDepthExceeded { max: 2 })
        ));
    }

    #[test]
    fn test_dispatch_by_class() {
        let (sql, _) = walk(json!({
            "collection_ids": {"$overlap": ["3f2b6c1e-8d4a-4c6b-9e2f-1a2b3c4d5e6f"]},
            "parent_id": "legacy-1",
            "metadata.topic": "ai"
        }))
        .unwrap();
        assert_eq!(
            sql,
            "(collection_ids && ARRAY[$1]::uuid[]) AND (parent_id = $2) AND (metadata->>'topic' = $3)"
        );
    }
}
