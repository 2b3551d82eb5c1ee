//! Public compile entry point

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::classifier::{is_valid_identifier, DEFAULT_JSON_COLUMN, DEFAULT_TOP_LEVEL_COLUMNS};
use super::expression::FilterExpression;
use super::params::{ParamAccumulator, SqlParam};
use super::walker::FilterWalker;
use crate::domain::FilterError;

/// Default ceiling on logical-group and metadata-path nesting
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// How metadata `$in` / `$nin` are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataInStrategy {
    /// `(metadata->>'k') IN ($1, $2, ...)`
    #[default]
    PlaceholderList,
    /// `metadata->'k' = ANY(SELECT jsonb_array_elements($1::jsonb))`
    JsonArrayElements,
}

impl FromStr for MetadataInStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "placeholder_list" | "placeholder-list" => Ok(Self::PlaceholderList),
            "json_array_elements" | "json-array-elements" => Ok(Self::JsonArrayElements),
            other => Err(format!("unknown metadata IN strategy: {}", other)),
        }
    }
}

/// Output shape of a compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompileMode {
    /// Bare boolean condition (`TRUE` for an empty filter)
    #[default]
    Condition,
    /// `WHERE <condition>`, or nothing at all for an empty filter
    WhereClause,
}

impl FromStr for CompileMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "condition" => Ok(Self::Condition),
            "where-clause" | "where_clause" | "where" => Ok(Self::WhereClause),
            other => Err(format!("unknown compile mode: {}", other)),
        }
    }
}

impl fmt::Display for CompileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Condition => write!(f, "condition"),
            Self::WhereClause => write!(f, "where-clause"),
        }
    }
}

/// Compiler configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerConfig {
    /// Fields resolved as plain columns
    pub top_level_columns: BTreeSet<String>,
    /// JSON column holding user metadata
    pub json_column: String,
    /// Maximum nesting of logical groups and metadata paths
    pub max_depth: usize,
    /// Wrap `$like` / `$ilike` operands in `%` when they carry no wildcard
    pub like_auto_wildcard: bool,
    /// Rendering of metadata `$in` / `$nin`
    pub metadata_in: MetadataInStrategy,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            top_level_columns: default_top_level_columns(),
            json_column: DEFAULT_JSON_COLUMN.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            like_auto_wildcard: false,
            metadata_in: MetadataInStrategy::default(),
        }
    }
}

fn default_top_level_columns() -> BTreeSet<String> {
    DEFAULT_TOP_LEVEL_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .collect()
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the plain columns; an empty set keeps the defaults
    pub fn with_top_level_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: BTreeSet<String> = columns.into_iter().map(Into::into).collect();
        self.top_level_columns = if columns.is_empty() {
            default_top_level_columns()
        } else {
            columns
        };
        self
    }

    pub fn with_json_column(mut self, column: impl Into<String>) -> Self {
        self.json_column = column.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_like_auto_wildcard(mut self, enabled: bool) -> Self {
        self.like_auto_wildcard = enabled;
        self
    }

    pub fn with_metadata_in(mut self, strategy: MetadataInStrategy) -> Self {
        self.metadata_in = strategy;
        self
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if !is_valid_identifier(&self.json_column) {
            return Err(FilterError::invalid_field(self.json_column.clone()));
        }
        if self.max_depth == 0 {
            return Err(FilterError::invalid_format("max_depth must be at least 1"));
        }
        Ok(())
    }
}

/// A compiled condition and its full parameter list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledCondition {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

/// Compiles filter expressions into parameterized PostgreSQL conditions
///
/// Stateless between calls; a single instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct FilterCompiler {
    config: CompilerConfig,
}

impl FilterCompiler {
    pub fn new(config: CompilerConfig) -> Result<Self, FilterError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile `expr`, numbering placeholders after `initial_params`
    pub fn compile(
        &self,
        expr: &FilterExpression,
        initial_params: Vec<SqlParam>,
        mode: CompileMode,
    ) -> Result<CompiledCondition, FilterError> {
        let mut params = ParamAccumulator::new(initial_params);
        let condition = FilterWalker::new(&self.config).walk(expr, &mut params)?;

        let sql = match mode {
            CompileMode::Condition => condition,
            CompileMode::WhereClause if expr.is_empty() => String::new(),
            CompileMode::WhereClause => format!("WHERE {}", condition),
        };

        let params = params.into_params();
        tracing::debug!(
            mode = %mode,
            entries = expr.len(),
            params = params.len(),
            "Compiled filter expression"
        );

        Ok(CompiledCondition { sql, params })
    }
}

/// Compile with the default configuration
pub fn compile_filter(
    expr: &FilterExpression,
    initial_params: Vec<SqlParam>,
    mode: CompileMode,
) -> Result<CompiledCondition, FilterError> {
    FilterCompiler::default().compile(expr, initial_params, mode)
}
