//! Structured filter compiler
//!
//! Turns nested filter expressions into parameterized PostgreSQL conditions.
//!
//! ```
//! use pmp_filter_compiler::domain::filter::{compile_filter, CompileMode, FilterExpression, SqlParam};
//!
//! let filter = FilterExpression::from_json(serde_json::json!({
//!     "$and": [{"id": "abc"}, {"status": "active"}]
//! }))
//! .unwrap();
//! let compiled = compile_filter(&filter, Vec::new(), CompileMode::Condition).unwrap();
//!
//! assert_eq!(compiled.sql, "(id = $1) AND (status = $2)");
//! assert_eq!(compiled.params, vec![SqlParam::from("abc"), SqlParam::from("active")]);
//! ```

mod classifier;
mod compiler;
mod expression;
mod metadata;
mod operator;
mod params;
mod special;
mod standard;
mod value;
mod walker;

pub use classifier::{
    is_valid_identifier, ClassifiedField, FieldClassifier, COLLECTION_COLUMN, COLLECTION_FIELDS,
    DEFAULT_JSON_COLUMN, DEFAULT_TOP_LEVEL_COLUMNS, PARENT_FIELD,
};
pub use compiler::{
    compile_filter, CompileMode, CompiledCondition, CompilerConfig, FilterCompiler,
    MetadataInStrategy, DEFAULT_MAX_DEPTH,
};
pub use expression::{ConditionSpec, FilterBuilder, FilterExpression};
pub use operator::{FieldClass, Operator};
pub use params::{ParamAccumulator, SqlParam};
pub use value::FilterValue;
