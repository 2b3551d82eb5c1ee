//! PMP Filter Compiler
//!
//! Compiles nested JSON filter expressions into parameterized PostgreSQL
//! conditions for search, listing and deletion queries:
//! - Plain columns, UUID-array collection membership and parent references
//! - Dot-path navigation into the JSON metadata column
//! - `$and` / `$or` groups with implicit AND between sibling conditions
//! - `$N` placeholders numbered after any caller-supplied parameters

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::filter::{
    compile_filter, CompileMode, CompiledCondition, CompilerConfig, FilterBuilder, FilterCompiler,
    FilterExpression, SqlParam,
};
pub use domain::FilterError;
