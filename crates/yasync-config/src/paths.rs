//! Filesystem path normalization shared by the folder table and the locator.
//!
//! Every path that takes part in a folder lookup goes through [`normalize`],
//! so that `~/Sync`, `/home/alice/Sync/` and a symlink pointing at the same
//! directory all compare equal.

use std::path::{Component, Path, PathBuf};

/// Expand a leading `~` component to the current user's home directory.
///
/// Paths without a leading `~`, or systems without a resolvable home
/// directory, are returned unchanged. `~user` forms are not expanded.
pub fn expand_home(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => match dirs::home_dir() {
            Some(home) => home.join(components.as_path()),
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

/// Normalize a path into an absolute, symlink-free form.
///
/// The path does not need to exist. For a missing path the longest existing
/// ancestor is canonicalized and the remaining components are appended, so
/// normalization never fails.
pub fn normalize(path: &Path) -> PathBuf {
    let expanded = expand_home(path);
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(expanded),
            Err(_) => expanded,
        }
    };

    if let Ok(resolved) = std::fs::canonicalize(&absolute) {
        return resolved;
    }

    let cleaned = lexical_clean(&absolute);
    let mut existing = cleaned.as_path();
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.file_name(), existing.parent()) {
            (Some(name), Some(parent)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }

    let mut resolved = std::fs::canonicalize(existing).unwrap_or_else(|_| existing.to_path_buf());
    for name in missing.iter().rev() {
        resolved.push(name);
    }
    resolved
}

/// Drop `.` components and fold `..` into its parent without touching the
/// filesystem.
fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_expand_home_replaces_tilde() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_home(Path::new("~/Sync")), home.join("Sync"));
        assert_eq!(expand_home(Path::new("~")), home);
    }

    #[test]
    fn test_expand_home_leaves_other_paths() {
        assert_eq!(
            expand_home(Path::new("/srv/~/data")),
            PathBuf::from("/srv/~/data")
        );
        assert_eq!(
            expand_home(Path::new("~bob/data")),
            PathBuf::from("~bob/data")
        );
    }

    #[test]
    fn test_normalize_existing_dir() {
        let tmp = TempDir::new().unwrap();
        let canonical = std::fs::canonicalize(tmp.path()).unwrap();
        assert_eq!(normalize(tmp.path()), canonical);
    }

    #[test]
    fn test_normalize_strips_trailing_slash_and_dots() {
        let tmp = TempDir::new().unwrap();
        let canonical = std::fs::canonicalize(tmp.path()).unwrap();
        std::fs::create_dir(canonical.join("a")).unwrap();

        let messy = PathBuf::from(format!("{}/./a/../a/", tmp.path().display()));
        assert_eq!(normalize(&messy), canonical.join("a"));
    }

    #[test]
    fn test_normalize_missing_tail_keeps_components() {
        let tmp = TempDir::new().unwrap();
        let canonical = std::fs::canonicalize(tmp.path()).unwrap();
        let target = tmp.path().join("docs/../notes/todo.txt");
        assert_eq!(normalize(&target), canonical.join("notes").join("todo.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_normalize_resolves_symlinks() {
        let tmp = TempDir::new().unwrap();
        let canonical = std::fs::canonicalize(tmp.path()).unwrap();
        std::fs::create_dir(canonical.join("real")).unwrap();
        std::os::unix::fs::symlink(canonical.join("real"), canonical.join("link")).unwrap();

        assert_eq!(normalize(&canonical.join("link")), canonical.join("real"));
        assert_eq!(
            normalize(&canonical.join("link").join("missing.txt")),
            canonical.join("real").join("missing.txt")
        );
    }

    #[test]
    fn test_normalize_relative_is_absolute() {
        assert!(normalize(Path::new("some/relative/path")).is_absolute());
    }
}
