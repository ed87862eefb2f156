// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod mock;

/// Abstract filesystem interface used by the directory-tree display.
///
/// Symbolic links are never followed: a link is reported as a file, whatever
/// it points at.
pub trait FileSystem: Send + Sync + Debug {
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;

    /// Return a list of entries in a directory.
    /// Returns full paths.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        fs::symlink_metadata(path)
            .map(|meta| meta.is_file() || meta.file_type().is_symlink())
            .unwrap_or(false)
    }

    fn is_dir(&self, path: &Path) -> bool {
        fs::symlink_metadata(path)
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("reading dir {:?}", path))? {
            let entry = entry.with_context(|| format!("reading entry in {:?}", path))?;
            entries.push(entry.path());
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_fs_lists_entries_with_full_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.js"), "").unwrap();
        fs::create_dir(dir.path().join("lib")).unwrap();

        let fs = RealFileSystem;
        let mut entries = fs.read_dir(dir.path()).unwrap();
        entries.sort();

        assert_eq!(entries, vec![dir.path().join("app.js"), dir.path().join("lib")]);
        assert!(fs.is_file(&entries[0]));
        assert!(fs.is_dir(&entries[1]));
    }

    #[cfg(unix)]
    #[test]
    fn real_fs_does_not_follow_directory_links() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("loop");
        std::os::unix::fs::symlink(dir.path(), &link).unwrap();

        let fs = RealFileSystem;
        assert!(!fs.is_dir(&link));
        assert!(fs.is_file(&link));
    }

    #[test]
    fn real_fs_read_dir_error_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = RealFileSystem.read_dir(&missing).unwrap_err();
        assert!(format!("{err:#}").contains("missing"));
    }
}
