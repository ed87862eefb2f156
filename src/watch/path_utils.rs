// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::Path;

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// - First we try a direct `strip_prefix(root)`.
/// - If that fails (e.g. due to symlinks or different absolute prefixes),
///   we canonicalize both paths and try again.
/// - Removed files cannot be canonicalized; for those we canonicalize the
///   parent directory and re-attach the file name.
///
/// Returns `None` if the path cannot be reasonably related to `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_forward_slashes(rel));
    }

    let root_canon = root.canonicalize().ok()?;

    if let Ok(path_canon) = path.canonicalize() {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return Some(to_forward_slashes(rel));
        }
    }

    let parent = path.parent()?.canonicalize().ok()?;
    let file_name = path.file_name()?;
    let rebuilt = parent.join(file_name);
    rebuilt
        .strip_prefix(&root_canon)
        .ok()
        .map(to_forward_slashes)
}

fn to_forward_slashes(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn strips_root_prefix() {
        let root = PathBuf::from("/srv/app");
        let path = root.join("src").join("index.js");
        assert_eq!(relative_str(&root, &path).as_deref(), Some("src/index.js"));
    }

    #[test]
    fn unrelated_path_is_none() {
        let root = PathBuf::from("/srv/app-that-does-not-exist");
        let path = PathBuf::from("/elsewhere/index.js");
        assert_eq!(relative_str(&root, &path), None);
    }

    #[cfg(unix)]
    #[test]
    fn removed_file_under_symlinked_root_is_resolved() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().canonicalize().unwrap().join("real");
        std::fs::create_dir(&real).unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        // Events arrive with the resolved prefix; the file is already gone.
        let path = real.join("gone.js");
        assert_eq!(relative_str(&link, &path).as_deref(), Some("gone.js"));
    }
}
