//! Filter expressions and per-field condition specs

use serde::{Deserialize, Deserializer};

use super::operator::{is_operator_key, Operator};
use super::value::FilterValue;
use crate::domain::FilterError;

/// A nested filter: field keys mapped to conditions, plus `$and` / `$or` groups
///
/// Entries keep insertion order. Several field keys at one level are
/// implicitly ANDed, in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterExpression {
    entries: Vec<(String, FilterValue)>,
}

impl FilterExpression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<(String, FilterValue)>) -> Self {
        Self { entries }
    }

    /// Decode an already-parsed JSON document
    pub fn from_json(value: serde_json::Value) -> Result<Self, FilterError> {
        Self::try_from(FilterValue::from(value))
    }

    pub fn entries(&self) -> &[(String, FilterValue)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.entries.push((key.into(), value.into()));
    }
}

impl TryFrom<FilterValue> for FilterExpression {
    type Error = FilterError;

    fn try_from(value: FilterValue) -> Result<Self, Self::Error> {
        match value {
            FilterValue::Object(entries) => Ok(Self { entries }),
            other => Err(FilterError::invalid_format(format!(
                "filter must be an object, got {}",
                other.kind()
            ))),
        }
    }
}

impl From<FilterExpression> for FilterValue {
    fn from(expr: FilterExpression) -> Self {
        FilterValue::Object(expr.entries)
    }
}

impl<'de> Deserialize<'de> for FilterExpression {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = FilterValue::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}

/// The value attached to one field key, resolved into its shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConditionSpec<'a> {
    /// Bare value: equality (or overlap / membership for lists)
    Literal(&'a FilterValue),
    /// `{ "$op": operand }`
    Operator(Operator, &'a FilterValue),
    /// `{ "child": spec, ... }` continuing the field's path
    Path(&'a [(String, FilterValue)]),
}

impl<'a> ConditionSpec<'a> {
    pub fn parse(field: &str, value: &'a FilterValue) -> Result<Self, FilterError> {
        let FilterValue::Object(entries) = value else {
            return Ok(Self::Literal(value));
        };

        if entries.is_empty() {
            return Err(FilterError::invalid_format(format!(
                "empty condition for field '{}'",
                field
            )));
        }

        let operator_keys: Vec<&str> = entries
            .iter()
            .map(|(k, _)| k.as_str())
            .filter(|k| is_operator_key(k))
            .collect();

        if operator_keys.is_empty() {
            return Ok(Self::Path(entries));
        }
        if operator_keys.len() != entries.len() {
            return Err(FilterError::invalid_format(format!(
                "condition for field '{}' mixes operators and nested fields",
                field
            )));
        }
        if operator_keys.len() > 1 {
            return Err(FilterError::multiple_operators(field, &operator_keys));
        }

        let (key, operand) = &entries[0];
        let operator =
            Operator::from_key(key).ok_or_else(|| FilterError::unknown_operator(field, key))?;
        if operator.is_logical() {
            return Err(FilterError::invalid_format(format!(
                "logical operator '{}' cannot be used as a condition on field '{}'",
                key, field
            )));
        }

        Ok(Self::Operator(operator, operand))
    }
}

/// Builder for creating filter expressions in code
#[derive(Debug, Default)]
pub struct FilterBuilder {
    expr: FilterExpression,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn op(mut self, key: impl Into<String>, operator: Operator, value: FilterValue) -> Self {
        self.expr.push(
            key,
            FilterValue::Object(vec![(operator.key().to_string(), value)]),
        );
        self
    }

    /// Add a bare value condition (equality / membership shorthand)
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.expr.push(key, value);
        self
    }

    pub fn eq(self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.op(key, Operator::Eq, value.into())
    }

    pub fn ne(self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.op(key, Operator::Ne, value.into())
    }

    pub fn gt(self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.op(key, Operator::Gt, value.into())
    }

    pub fn gte(self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.op(key, Operator::Gte, value.into())
    }

    pub fn lt(self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.op(key, Operator::Lt, value.into())
    }

    pub fn lte(self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.op(key, Operator::Lte, value.into())
    }

    pub fn like(self, key: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.op(key, Operator::Like, FilterValue::String(pattern.into()))
    }

    pub fn ilike(self, key: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.op(key, Operator::ILike, FilterValue::String(pattern.into()))
    }

    pub fn in_list(self, key: impl Into<String>, values: Vec<FilterValue>) -> Self {
        self.op(key, Operator::In, FilterValue::List(values))
    }

    pub fn not_in_list(self, key: impl Into<String>, values: Vec<FilterValue>) -> Self {
        self.op(key, Operator::Nin, FilterValue::List(values))
    }

    pub fn overlap(self, key: impl Into<String>, values: Vec<FilterValue>) -> Self {
        self.op(key, Operator::Overlap, FilterValue::List(values))
    }

    pub fn contains(self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.op(key, Operator::Contains, value.into())
    }

    pub fn is_null(self, key: impl Into<String>) -> Self {
        self.op(key, Operator::Eq, FilterValue::Null)
    }

    pub fn is_not_null(self, key: impl Into<String>) -> Self {
        self.op(key, Operator::Ne, FilterValue::Null)
    }

    /// Add an `$and` group of nested expressions
    pub fn and(self, filters: Vec<FilterExpression>) -> Self {
        self.group(Operator::And, filters)
    }

    /// Add an `$or` group of nested expressions
    pub fn or(self, filters: Vec<FilterExpression>) -> Self {
        self.group(Operator::Or, filters)
    }

    fn group(mut self, operator: Operator, filters: Vec<FilterExpression>) -> Self {
        let items = filters.into_iter().map(FilterValue::from).collect();
        self.expr.push(operator.key(), FilterValue::List(items));
        self
    }

    pub fn build(self) -> FilterExpression {
        self.expr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_requires_object() {
        assert!(FilterExpression::from_json(json!({"id": "abc"})).is_ok());
        assert!(matches!(
            FilterExpression::from_json(json!(["id"])),
            Err(FilterError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_deserialize_expression() {
        let expr: FilterExpression =
            serde_json::from_str(r#"{"status": "active", "score": {"$gt": 5}}"#).unwrap();
        assert_eq!(expr.len(), 2);
        assert_eq!(expr.entries()[0].0, "status");

        let err = serde_json::from_str::<FilterExpression>("42");
        assert!(err.is_err());
    }

    #[test]
    fn test_parse_literal() {
        let value = FilterValue::from("abc");
        assert_eq!(
            ConditionSpec::parse("id", &value).unwrap(),
            ConditionSpec::Literal(&value)
        );
    }

    #[test]
    fn test_parse_operator() {
        let value = FilterValue::from(json!({"$gte": 3}));
        let spec = ConditionSpec::parse("score", &value).unwrap();
        assert_eq!(
            spec,
            ConditionSpec::Operator(Operator::Gte, &FilterValue::Integer(3))
        );
    }

    #[test]
    fn test_parse_path_continuation() {
        let value = FilterValue::from(json!({"b": {"$eq": 1}}));
        assert!(matches!(
            ConditionSpec::parse("a", &value).unwrap(),
            ConditionSpec::Path(entries) if entries.len() == 1
        ));
    }

    #[test]
    fn test_parse_multiple_operators() {
        let value = FilterValue::from(json!({"$gt": 1, "$lt": 5}));
        assert!(matches!(
            ConditionSpec::parse("score", &value),
            Err(FilterError::MultipleOperators { .. })
        ));
    }

    #[test]
    fn test_parse_invalid_shapes() {
        let mixed = FilterValue::from(json!({"$gt": 1, "nested": 5}));
        assert!(matches!(
            ConditionSpec::parse("score", &mixed),
            Err(FilterError::InvalidFormat { .. })
        ));

        let unknown = FilterValue::from(json!({"$between": [1, 2]}));
        assert!(matches!(
            ConditionSpec::parse("score", &unknown),
            Err(FilterError::UnknownOperator { .. })
        ));

        let logical = FilterValue::from(json!({"$or": []}));
        assert!(matches!(
            ConditionSpec::parse("score", &logical),
            Err(FilterError::InvalidFormat { .. })
        ));

        let empty = FilterValue::from(json!({}));
        assert!(ConditionSpec::parse("score", &empty).is_err());
    }

    #[test]
    fn test_builder_matches_json() {
        let built = FilterBuilder::new()
            .eq("category", "docs")
            .gt("version", 1i64)
            .or(vec![
                FilterBuilder::new().field("status", "active").build(),
                FilterBuilder::new().is_null("owner_id").build(),
            ])
            .build();

        let decoded = FilterExpression::from_json(json!({
            "category": {"$eq": "docs"},
            "version": {"$gt": 1},
            "$or": [{"status": "active"}, {"owner_id": {"$eq": null}}]
        }))
        .unwrap();

        assert_eq!(built, decoded);
    }

    #[test]
    fn test_builder_empty() {
        let expr = FilterBuilder::new().build();
        assert!(expr.is_empty());
    }
}
