use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::{ConfigOverrides, PrefixRemoval};

/// Everything the command line decides for a single run.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub working_dir: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub overrides: ConfigOverrides,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        let overrides = ConfigOverrides {
            root: cli.root,
            prefix_token: cli.prefix,
            marker: cli.marker,
            ascent: cli.ascent,
            prefix_removal: cli.remove_first_prefix_only.then_some(PrefixRemoval::First),
            sort_entries: cli.sorted.then_some(true),
        };

        Self {
            working_dir: cli.directory,
            config_file: cli.config,
            overrides,
        }
    }
}
