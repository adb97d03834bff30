use clap::ValueEnum;

pub mod commands;

/// How command results are printed to stdout
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}
