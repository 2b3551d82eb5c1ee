//! CLI module for the filter compiler
//!
//! Provides subcommands for working with filter expressions:
//! - `compile`: compile a filter into SQL text and parameters
//! - `classify`: show how a field name resolves

pub mod classify;
pub mod compile;

use clap::{Args, Parser, Subcommand};
use tracing::warn;

use crate::config::AppConfig;
use crate::domain::filter::{CompilerConfig, MetadataInStrategy};
use crate::infrastructure::logging;

/// PMP filter compiler - nested JSON filters to parameterized PostgreSQL
#[derive(Parser)]
#[command(name = "pmp-filter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compile a filter expression
    Compile(compile::CompileArgs),

    /// Show the class and path a field name resolves to
    Classify(classify::ClassifyArgs),
}

/// Compiler overrides shared by every subcommand
#[derive(Args, Clone, Debug, Default)]
pub struct CompilerArgs {
    /// Top-level column (repeatable; replaces the configured set)
    #[arg(long = "column")]
    pub columns: Vec<String>,

    /// JSON metadata column name (overrides config)
    #[arg(long)]
    pub json_column: Option<String>,

    /// Maximum nesting depth (overrides config)
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Wrap LIKE/ILIKE operands in % when they carry none
    #[arg(long)]
    pub like_wildcards: bool,

    /// Metadata IN rendering: placeholder-list or json-array-elements
    #[arg(long)]
    pub metadata_in: Option<MetadataInStrategy>,
}

impl CompilerArgs {
    /// Layer the flags over the configured compiler settings
    pub fn apply(&self, mut config: CompilerConfig) -> CompilerConfig {
        if !self.columns.is_empty() {
            config = config.with_top_level_columns(self.columns.iter().cloned());
        }
        if let Some(column) = &self.json_column {
            config = config.with_json_column(column.clone());
        }
        if let Some(depth) = self.max_depth {
            config = config.with_max_depth(depth);
        }
        if self.like_wildcards {
            config = config.with_like_auto_wildcard(true);
        }
        if let Some(strategy) = self.metadata_in {
            config = config.with_metadata_in(strategy);
        }
        config
    }
}

/// Load `.env` and configuration, then install logging
pub fn init(verbose: bool) -> AppConfig {
    dotenvy::dotenv().ok();

    let loaded = AppConfig::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();
    logging::init_logging(&config.logging, verbose);

    if let Err(e) = loaded {
        warn!(error = %e, "Failed to load configuration, using defaults");
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compile_command() {
        let cli = Cli::try_parse_from([
            "pmp-filter",
            "compile",
            "--filter",
            r#"{"id": "x"}"#,
            "--mode",
            "where-clause",
            "--column",
            "id",
            "--metadata-in",
            "json-array-elements",
        ])
        .unwrap();

        let Command::Compile(args) = cli.command else {
            panic!("Expected compile command");
        };
        assert_eq!(args.compiler.columns, vec!["id"]);
        assert_eq!(
            args.compiler.metadata_in,
            Some(MetadataInStrategy::JsonArrayElements)
        );
    }

    #[test]
    fn test_compiler_args_override_config() {
        let args = CompilerArgs {
            columns: vec!["region".to_string()],
            json_column: Some("attrs".to_string()),
            max_depth: Some(4),
            like_wildcards: true,
            metadata_in: None,
        };
        let config = args.apply(CompilerConfig::default());

        assert_eq!(config.json_column, "attrs");
        assert_eq!(config.max_depth, 4);
        assert!(config.like_auto_wildcard);
        assert!(config.top_level_columns.contains("region"));
        assert!(!config.top_level_columns.contains("id"));
        assert_eq!(config.metadata_in, MetadataInStrategy::PlaceholderList);
    }

    #[test]
    fn test_empty_args_keep_config() {
        let config = CompilerArgs::default().apply(CompilerConfig::default());
        assert_eq!(config, CompilerConfig::default());
    }
}
