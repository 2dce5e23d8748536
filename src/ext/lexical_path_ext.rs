use std::path::{Component, Path, PathBuf};

/// Resolves `.` and `..` components without touching the filesystem.
///
/// Symbolic links are not followed, so `a/link/..` becomes `a` even when `link`
/// points elsewhere. A `..` that would climb above the root of an absolute path
/// is dropped, while leading `..` components of a relative path are kept.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                Some(Component::ParentDir) | Some(Component::CurDir) | None => {
                    components.push(component);
                }
            },
            _ => components.push(component),
        }
    }

    if components.is_empty() {
        return PathBuf::from(".");
    }
    components.iter().collect()
}

/// Joins `path` onto `base` (unless it is already absolute) and normalizes the result.
pub fn absolutize_lexically(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_lexically(path)
    } else {
        normalize_lexically(&base.join(path))
    }
}

pub trait LexicalPathExt {
    fn absolutize_lexically(&self, base: &Path) -> PathBuf;
}

impl LexicalPathExt for Path {
    fn absolutize_lexically(&self, base: &Path) -> PathBuf {
        absolutize_lexically(self, base)
    }
}
