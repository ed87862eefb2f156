// src/display/tree.rs

//! Snapshot of the watched directory as a tree, plus its two renderings.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::fs::FileSystem;
use crate::watch::WatchFilter;

/// One node of a directory snapshot. Children are sorted by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    File,
    Dir(BTreeMap<String, TreeNode>),
}

/// Files serialize as the string `"file"`, directories as nested objects.
impl Serialize for TreeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            TreeNode::File => serializer.serialize_str("file"),
            TreeNode::Dir(children) => {
                let mut map = serializer.serialize_map(Some(children.len()))?;
                for (name, child) in children {
                    map.serialize_entry(name, child)?;
                }
                map.end()
            }
        }
    }
}

/// Walk `root` through `fs`, skipping everything `filter` ignores.
///
/// Symbolic links are listed as files and never descended into. Any
/// unreadable directory fails the whole snapshot; the error names the
/// directory.
pub fn build_tree(fs: &dyn FileSystem, root: &Path, filter: &WatchFilter) -> Result<TreeNode> {
    walk(fs, root, root, filter)
}

fn walk(fs: &dyn FileSystem, root: &Path, dir: &Path, filter: &WatchFilter) -> Result<TreeNode> {
    let entries = fs
        .read_dir(dir)
        .with_context(|| format!("reading directory {}", dir.display()))?;

    let mut children = BTreeMap::new();
    for entry in entries {
        let Some(name) = entry.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let rel = entry
            .strip_prefix(root)
            .unwrap_or(&entry)
            .to_string_lossy()
            .replace('\\', "/");

        if fs.is_dir(&entry) {
            if filter.is_ignored_dir(&rel) {
                continue;
            }
            children.insert(name, walk(fs, root, &entry, filter)?);
        } else if fs.is_file(&entry) {
            if filter.is_ignored(&rel) {
                continue;
            }
            children.insert(name, TreeNode::File);
        }
    }

    Ok(TreeNode::Dir(children))
}

/// Pretty-printed JSON, two-space indentation.
pub fn to_json(tree: &TreeNode) -> Result<String> {
    serde_json::to_string_pretty(tree).context("serializing directory tree")
}

/// One entry per line, nested entries indented by two spaces, directories
/// suffixed with `/`.
pub fn to_plain(tree: &TreeNode) -> String {
    let mut out = String::new();
    if let TreeNode::Dir(children) = tree {
        write_plain(children, 0, &mut out);
    }
    out
}

fn write_plain(children: &BTreeMap<String, TreeNode>, depth: usize, out: &mut String) {
    for (name, node) in children {
        let indent = "  ".repeat(depth);
        match node {
            TreeNode::File => {
                let _ = writeln!(out, "{indent}{name}");
            }
            TreeNode::Dir(grandchildren) => {
                let _ = writeln!(out, "{indent}{name}/");
                write_plain(grandchildren, depth + 1, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn filter() -> WatchFilter {
        WatchFilter::new(
            &["js".to_string()],
            &["**/node_modules/**".to_string(), "**/*.txt".to_string()],
        )
        .unwrap()
    }

    fn project() -> MockFileSystem {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/index.js");
        fs.add_file("/proj/notes.txt");
        fs.add_file("/proj/src/util.js");
        fs.add_file("/proj/src/style.css");
        fs.add_file("/proj/node_modules/dep/index.js");
        fs.add_dir("/proj/empty");
        fs
    }

    #[test]
    fn tree_skips_ignored_entries() {
        let tree = build_tree(&project(), Path::new("/proj"), &filter()).unwrap();

        let TreeNode::Dir(top) = &tree else {
            panic!("root must be a directory");
        };
        let names: Vec<_> = top.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["empty", "index.js", "src"]);

        // Unwatched extensions are still listed; only the ignore set hides entries.
        let TreeNode::Dir(src) = &top["src"] else {
            panic!("src must be a directory");
        };
        assert!(src.contains_key("style.css"));
    }

    #[test]
    fn json_marks_files_as_file() {
        let tree = build_tree(&project(), Path::new("/proj"), &filter()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&to_json(&tree).unwrap()).unwrap();

        assert_eq!(value["index.js"], "file");
        assert_eq!(value["src"]["util.js"], "file");
        assert_eq!(value["empty"], serde_json::json!({}));
    }

    #[test]
    fn plain_listing_indents_and_suffixes_directories() {
        let tree = build_tree(&project(), Path::new("/proj"), &filter()).unwrap();
        assert_eq!(
            to_plain(&tree),
            "empty/\nindex.js\nsrc/\n  style.css\n  util.js\n"
        );
    }

    #[test]
    fn unreadable_directory_fails_with_its_path() {
        let fs = project();
        fs.deny_read("/proj/src");

        let err = build_tree(&fs, Path::new("/proj"), &filter()).unwrap_err();
        assert!(format!("{err:#}").contains("/proj/src"));
    }
}
