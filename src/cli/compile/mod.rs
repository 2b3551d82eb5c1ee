//! Compile command - prints the SQL condition and parameters for a filter

use anyhow::Context;
use clap::Args;
use serde_json::Value;
use tracing::info;

use super::CompilerArgs;
use crate::domain::filter::{
    CompileMode, FilterCompiler, FilterExpression, FilterValue, SqlParam,
};

/// Arguments for the compile command
#[derive(Args, Clone, Debug)]
pub struct CompileArgs {
    /// Filter JSON, or @path to read it from a file
    #[arg(long)]
    pub filter: String,

    /// Output mode: condition or where-clause
    #[arg(long, default_value = "condition")]
    pub mode: CompileMode,

    /// Pre-existing parameter as JSON (repeatable); placeholders continue after these
    #[arg(long = "param")]
    pub params: Vec<String>,

    #[command(flatten)]
    pub compiler: CompilerArgs,
}

/// Run the compile command
pub fn run(args: CompileArgs, verbose: bool) -> anyhow::Result<()> {
    let config = super::init(verbose);
    let compiler = FilterCompiler::new(args.compiler.apply(config.compiler.to_compiler_config()))?;

    let raw = read_filter(&args.filter)?;
    let expr: FilterExpression =
        serde_json::from_str(&raw).context("Failed to parse filter JSON")?;

    let initial = args
        .params
        .iter()
        .map(|p| parse_param(p))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let initial_len = initial.len();

    let compiled = compiler.compile(&expr, initial, args.mode)?;
    info!(
        mode = %args.mode,
        new_params = compiled.params.len() - initial_len,
        "Filter compiled"
    );

    println!("{}", serde_json::to_string_pretty(&compiled)?);
    Ok(())
}

fn read_filter(arg: &str) -> anyhow::Result<String> {
    match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read filter file: {}", path)),
        None => Ok(arg.to_string()),
    }
}

/// Decode a `--param` value; bare text that is not JSON is taken as a string
fn parse_param(raw: &str) -> anyhow::Result<SqlParam> {
    let value = match serde_json::from_str::<Value>(raw) {
        Ok(value) => value,
        Err(_) => return Ok(SqlParam::Text(raw.to_string())),
    };
    Ok(param_from_json(value))
}

fn param_from_json(value: Value) -> SqlParam {
    match value {
        Value::Null => SqlParam::Null,
        Value::Bool(b) => SqlParam::Bool(b),
        Value::Number(n) => SqlParam::scalar(&FilterValue::from(n.clone()))
            .unwrap_or_else(|| SqlParam::Json(n.to_string())),
        Value::String(s) => SqlParam::Text(s),
        Value::Array(items) if items.iter().all(Value::is_string) => SqlParam::TextArray(
            items
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        ),
        other => SqlParam::Json(other.to_string()),
    }
}
