use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use crate::config::ResolverConfig;
use crate::resolver::candidate::{derive_candidate, is_relevant};

/// Counters gathered over one traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub directories_visited: usize,
    pub files_visited: usize,
    pub candidates_derived: usize,
    pub resolved: usize,
}

/// Walks the tooling tree and resolves wrapper files to the sources they test.
#[derive(Debug, Clone)]
pub struct Resolver {
    config: ResolverConfig,
    working_dir: PathBuf,
}

impl Resolver {
    /// `working_dir` stands in for the process's current directory: the root is
    /// listed relative to it and candidates are rebased from it.
    pub fn new(config: ResolverConfig, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            working_dir: working_dir.into(),
        }
    }

    /// Writes every resolved path to `out`, each followed by a single space.
    ///
    /// Paths already written stay written when a later directory fails to list.
    pub fn scan<W: Write>(&self, out: &mut W) -> Result<ScanSummary, ScanError> {
        let summary = self.walk_root(&mut |path| {
            write!(out, "{} ", path.display()).context(WriteOutputSnafu)
        })?;
        out.flush().context(WriteOutputSnafu)?;
        Ok(summary)
    }

    /// Runs the same traversal as [`Resolver::scan`] and collects the paths instead.
    #[cfg(test)]
    pub fn resolve(&self) -> Result<Vec<PathBuf>, ScanError> {
        let mut resolved = Vec::new();
        self.walk_root(&mut |path| {
            resolved.push(path.to_path_buf());
            Ok(())
        })?;
        Ok(resolved)
    }

    fn walk_root(
        &self,
        emit: &mut dyn FnMut(&Path) -> Result<(), ScanError>,
    ) -> Result<ScanSummary, ScanError> {
        let mut summary = ScanSummary::default();
        self.walk_dir(&self.config.root, &mut summary, emit)?;
        info!(
            "Scanned {} directories and {} files: {} candidates, {} resolved",
            summary.directories_visited,
            summary.files_visited,
            summary.candidates_derived,
            summary.resolved
        );
        Ok(summary)
    }

    fn walk_dir(
        &self,
        dir: &Path,
        summary: &mut ScanSummary,
        emit: &mut dyn FnMut(&Path) -> Result<(), ScanError>,
    ) -> Result<(), ScanError> {
        debug!("Visiting directory {}", dir.display());
        summary.directories_visited += 1;

        let (subdirectories, files) = self.list_dir(dir)?;

        for file in &files {
            summary.files_visited += 1;
            if !is_relevant(file, &self.config.marker) {
                continue;
            }

            let candidate = derive_candidate(file, &self.config, &self.working_dir);
            summary.candidates_derived += 1;
            if candidate.is_file() {
                debug!("Resolved {} to {}", file.display(), candidate.display());
                summary.resolved += 1;
                emit(&candidate)?;
            } else {
                debug!("No source at {} for {}", candidate.display(), file.display());
            }
        }

        for subdirectory in &subdirectories {
            self.walk_dir(subdirectory, summary, emit)?;
        }

        Ok(())
    }

    /// Splits a directory listing into sub-directories and regular files.
    ///
    /// Symbolic links count as whatever they point to. Anything else, including
    /// dangling links, is left out.
    fn list_dir(&self, dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>), ScanError> {
        let entries = fs::read_dir(self.working_dir.join(dir)).context(ListDirectorySnafu {
            path: dir.to_path_buf(),
        })?;

        let mut subdirectories = Vec::new();
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.context(ReadEntrySnafu {
                path: dir.to_path_buf(),
            })?;
            let visited = dir.join(entry.file_name());
            let on_disk = self.working_dir.join(&visited);
            if on_disk.is_dir() {
                subdirectories.push(visited);
            } else if on_disk.is_file() {
                files.push(visited);
            }
        }

        if self.config.sort_entries {
            subdirectories.sort();
            files.sort();
        }
        Ok((subdirectories, files))
    }
}

#[derive(Debug, Snafu)]
pub enum ScanError {
    #[snafu(display("Failed to list directory {}", path.display()))]
    ListDirectoryError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to read an entry of directory {}", path.display()))]
    ReadEntryError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write resolved paths"))]
    WriteOutputError { source: std::io::Error },
}
