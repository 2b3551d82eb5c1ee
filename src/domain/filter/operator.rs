//! Operators and field classes understood by the filter compiler

use std::fmt;

/// Prefix shared by every operator key (`$eq`, `$and`, ...)
pub const OPERATOR_PREFIX: char = '$';

/// Filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equal to
    Eq,
    /// Not equal to
    Ne,
    /// Less than
    Lt,
    /// Less than or equal to
    Lte,
    /// Greater than
    Gt,
    /// Greater than or equal to
    Gte,
    /// Case-sensitive pattern match
    Like,
    /// Case-insensitive pattern match
    ILike,
    /// In list of values
    In,
    /// Not in list of values
    Nin,
    /// Shares at least one element with a list
    Overlap,
    /// Contains every element / JSON containment
    Contains,
    /// Logical AND over nested expressions
    And,
    /// Logical OR over nested expressions
    Or,
}

impl Operator {
    /// Resolve an operator from its key (`"$gt"`, `"$array_contains"`, ...)
    pub fn from_key(key: &str) -> Option<Self> {
        let op = match key {
            "$eq" => Self::Eq,
            "$ne" => Self::Ne,
            "$lt" => Self::Lt,
            "$lte" => Self::Lte,
            "$gt" => Self::Gt,
            "$gte" => Self::Gte,
            "$like" => Self::Like,
            "$ilike" => Self::ILike,
            "$in" => Self::In,
            "$nin" => Self::Nin,
            "$overlap" => Self::Overlap,
            "$contains" | "$array_contains" => Self::Contains,
            "$and" => Self::And,
            "$or" => Self::Or,
            _ => return None,
        };
        Some(op)
    }

    /// Canonical key for this operator
    pub fn key(&self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Like => "$like",
            Self::ILike => "$ilike",
            Self::In => "$in",
            Self::Nin => "$nin",
            Self::Overlap => "$overlap",
            Self::Contains => "$contains",
            Self::And => "$and",
            Self::Or => "$or",
        }
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    /// SQL comparison symbol for scalar comparison operators
    pub fn comparison_sql(&self) -> Option<&'static str> {
        match self {
            Self::Eq => Some("="),
            Self::Ne => Some("!="),
            Self::Lt => Some("<"),
            Self::Lte => Some("<="),
            Self::Gt => Some(">"),
            Self::Gte => Some(">="),
            _ => None,
        }
    }

    /// SQL keyword for pattern operators
    pub fn pattern_sql(&self) -> Option<&'static str> {
        match self {
            Self::Like => Some("LIKE"),
            Self::ILike => Some("ILIKE"),
            _ => None,
        }
    }
}

/// Whether a key looks like an operator, known or not
pub fn is_operator_key(key: &str) -> bool {
    key.starts_with(OPERATOR_PREFIX)
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Storage representation a field name resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldClass {
    /// Plain, non-JSON column
    StandardColumn,
    /// UUID-array collection membership column
    ArrayMembership,
    /// Scalar parent reference column
    HierarchicalReference,
    /// Path inside the JSON metadata column
    MetadataPath,
}

impl FieldClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StandardColumn => "standard_column",
            Self::ArrayMembership => "array_membership",
            Self::HierarchicalReference => "hierarchical_reference",
            Self::MetadataPath => "metadata_path",
        }
    }
}

impl fmt::Display for FieldClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
