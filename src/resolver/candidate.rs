use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::config::ResolverConfig;
use crate::ext::LexicalPathExt;

/// Whether a visited file is a wrapper whose source file should be resolved.
///
/// The marker is matched against the whole visited path, so a directory name
/// containing it makes every file below it relevant.
pub fn is_relevant(visited: &Path, marker: &str) -> bool {
    let marker = marker.as_bytes();
    if marker.is_empty() {
        return true;
    }
    visited
        .as_os_str()
        .as_encoded_bytes()
        .windows(marker.len())
        .any(|window| window == marker)
}

/// Maps a visited wrapper path to the absolute path of the file it tests.
///
/// The prefix token is stripped from the path text, the result is placed
/// `config.ascent` levels above `working_dir` and `.`/`..` are resolved lexically.
/// A leading root on the stripped path is dropped so it is always rebased.
pub fn derive_candidate(visited: &Path, config: &ResolverConfig, working_dir: &Path) -> PathBuf {
    let stripped = strip_prefix_token(visited, config);

    let mut rebased: PathBuf = std::iter::repeat_n(Component::ParentDir, config.ascent).collect();
    for component in Path::new(&stripped).components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {}
            other => rebased.push(other),
        }
    }

    rebased.absolutize_lexically(working_dir)
}

#[cfg(unix)]
fn strip_prefix_token(visited: &Path, config: &ResolverConfig) -> OsString {
    use std::os::unix::ffi::OsStringExt;

    let bytes = config.prefix_removal.apply(
        visited.as_os_str().as_encoded_bytes(),
        config.prefix_token.as_bytes(),
    );
    OsString::from_vec(bytes)
}

// Paths that are not valid Unicode are replaced lossily here.
#[cfg(not(unix))]
fn strip_prefix_token(visited: &Path, config: &ResolverConfig) -> OsString {
    let visited = visited.to_string_lossy();
    let bytes = config
        .prefix_removal
        .apply(visited.as_bytes(), config.prefix_token.as_bytes());
    OsString::from(String::from_utf8_lossy(&bytes).into_owned())
}
