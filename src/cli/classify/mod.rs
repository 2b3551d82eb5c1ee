//! Classify command - shows how a field name resolves

use clap::Args;
use serde::Serialize;

use super::CompilerArgs;
use crate::domain::filter::{ClassifiedField, FieldClassifier, FilterCompiler};

/// Arguments for the classify command
#[derive(Args, Clone, Debug)]
pub struct ClassifyArgs {
    /// Field names to classify
    #[arg(required = true)]
    pub fields: Vec<String>,

    #[command(flatten)]
    pub compiler: CompilerArgs,
}

#[derive(Debug, Serialize)]
struct Classification<'a> {
    field: &'a str,
    class: &'static str,
    column: String,
    path: Vec<String>,
}

impl<'a> Classification<'a> {
    fn new(field: &'a str, classified: ClassifiedField) -> Self {
        Self {
            field,
            class: classified.class.as_str(),
            column: classified.column,
            path: classified.path,
        }
    }
}

/// Run the classify command
pub fn run(args: ClassifyArgs, verbose: bool) -> anyhow::Result<()> {
    let config = super::init(verbose);
    let compiler = FilterCompiler::new(args.compiler.apply(config.compiler.to_compiler_config()))?;
    let settings = compiler.config();
    let classifier = FieldClassifier::new(&settings.top_level_columns, &settings.json_column);

    let results = args
        .fields
        .iter()
        .map(|field| Ok(Classification::new(field, classifier.classify(field)?)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
