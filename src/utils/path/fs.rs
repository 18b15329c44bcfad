//! Path normalization utilities.
//!
//! - `anchor` - resolve a possibly relative path against a base directory
//! - `clean_path` - lexical `.`/`..` folding that never touches the disk
//! - `to_slash` - forward-slash form used for glob patterns

use std::path::{Component, Path, PathBuf};

/// Join `path` onto `base` unless it is already absolute, then clean it.
#[inline]
pub fn anchor(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        clean_path(path)
    } else {
        clean_path(&base.join(path))
    }
}

/// Fold `.` and `..` components without consulting the filesystem.
///
/// Glob patterns must survive this untouched, so `canonicalize` is not an
/// option here. A `..` that would climb above the root is dropped.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Render a path with forward slashes only.
#[inline]
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_relative_joins_base() {
        let anchored = anchor(Path::new("/project"), "res/icons/*.png");
        assert_eq!(anchored, PathBuf::from("/project/res/icons/*.png"));
    }

    #[cfg(unix)]
    #[test]
    fn test_anchor_absolute_ignores_base() {
        let anchored = anchor(Path::new("/project"), "/shared/logo.svg");
        assert_eq!(anchored, PathBuf::from("/shared/logo.svg"));
    }

    #[test]
    fn test_clean_path_folds_dots() {
        assert_eq!(
            clean_path(Path::new("/a/./b/../c/*.png")),
            PathBuf::from("/a/c/*.png")
        );
        assert_eq!(clean_path(Path::new("../up/x")), PathBuf::from("../up/x"));
        assert_eq!(clean_path(Path::new("/../x")), PathBuf::from("/x"));
    }

    #[test]
    fn test_to_slash() {
        assert_eq!(to_slash(Path::new("a/b.png")), "a/b.png");
        assert_eq!(to_slash(Path::new(r"a\b\c.png")), "a/b/c.png");
    }
}
