use clap::Parser;
use pmp_filter_compiler::cli::{self, Cli, Command};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Compile(args) => cli::compile::run(args, cli.verbose),
        Command::Classify(args) => cli::classify::run(args, cli.verbose),
    }
}
