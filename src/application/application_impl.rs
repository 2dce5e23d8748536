use std::env;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use snafu::Snafu;
use snafu::prelude::*;
use tracing::debug;

use crate::application::RuntimeConfig;
use crate::config::{ConfigError, ResolverConfig};
use crate::ext::LexicalPathExt;
use crate::resolver::{Resolver, ScanError, ScanSummary};

pub struct Application;

impl Application {
    /// Resolves the configured tooling tree and prints the results to stdout.
    pub fn run(app_config: impl Into<RuntimeConfig>) -> Result<ScanSummary, ApplicationError> {
        let mut stdout = BufWriter::new(io::stdout().lock());
        Self::run_with_output(app_config, &mut stdout)
    }

    pub fn run_with_output<W: Write>(
        app_config: impl Into<RuntimeConfig>,
        out: &mut W,
    ) -> Result<ScanSummary, ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let working_dir = absolute_working_dir(app_config.working_dir)?;
        debug!("Working directory: {}", working_dir.display());

        let mut config = ResolverConfig::load(&working_dir, app_config.config_file.as_deref())
            .context(ConfigSnafu)?;
        config.apply(app_config.overrides);
        debug!("Loaded config: {:?}", config);

        let root = config.root.clone();
        Resolver::new(config, working_dir)
            .scan(out)
            .context(ScanSnafu { root })
    }
}

/// Printed candidates are only absolute when the working dir is.
fn absolute_working_dir(dir: Option<PathBuf>) -> Result<PathBuf, ApplicationError> {
    match dir {
        Some(dir) if dir.is_absolute() => Ok(dir),
        Some(dir) => {
            let current_dir = env::current_dir().context(CurrentDirSnafu)?;
            Ok(dir.absolutize_lexically(&current_dir))
        }
        None => env::current_dir().context(CurrentDirSnafu),
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Failed to obtain current dir"))]
    CurrentDirError { source: std::io::Error },
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigError { source: ConfigError },
    #[snafu(display("Critical failure encountered while scanning {}", root.display()))]
    ScanError { root: PathBuf, source: ScanError },
}
