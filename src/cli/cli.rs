use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Prints the sources exercised by the test wrappers under a tooling tree,
/// space-separated, for substitution into a compiler command line.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// Tooling directory to scan [default: test_ex2_obc_software]
    pub root: Option<PathBuf>,

    /// Token removed from wrapper paths [default: test_]
    #[clap(long)]
    pub prefix: Option<String>,

    /// Substring a path must contain to be resolved [default: .c]
    #[clap(long, value_parser = clap::builder::NonEmptyStringValueParser::new())]
    pub marker: Option<String>,

    /// Directory levels between the tooling directory and the source tree [default: 2]
    #[clap(long)]
    pub ascent: Option<usize>,

    /// Only remove the first occurrence of the prefix token
    #[clap(long)]
    pub remove_first_prefix_only: bool,

    /// Sort directory entries so output order is stable
    #[clap(long)]
    pub sorted: bool,

    /// Resolve everything relative to this directory instead of the current one
    #[clap(long, short = 'C')]
    pub directory: Option<PathBuf>,

    /// YAML config file [default: sut_deps.yaml, if present]
    #[clap(long, short)]
    pub config: Option<PathBuf>,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
}
