// src/display/mod.rs

//! Optional directory-tree output driven by the operator's display toggles.

pub mod tree;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use crate::console;
use crate::fs::FileSystem;
use crate::types::{DisplayMode, WatchScope};
use crate::watch::{WatchEvent, WatchFilter};

pub use tree::{TreeNode, build_tree, to_json, to_plain};

/// Display settings plus what is needed to render the watched tree.
///
/// Read errors never escape: they are logged and shown to the operator.
pub struct TreeDisplay {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
    filter: WatchFilter,
    mode: DisplayMode,
    scope: WatchScope,
}

impl fmt::Debug for TreeDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeDisplay")
            .field("root", &self.root)
            .field("mode", &self.mode)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl TreeDisplay {
    pub fn new(
        root: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
        filter: WatchFilter,
        mode: DisplayMode,
        scope: WatchScope,
    ) -> Self {
        Self {
            root: root.into(),
            fs,
            filter,
            mode,
            scope,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn scope(&self) -> WatchScope {
        self.scope
    }

    pub fn toggle_format(&mut self) -> DisplayMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    pub fn toggle_tree(&mut self) -> WatchScope {
        self.scope = self.scope.toggled();
        self.scope
    }

    /// Snapshot the tree and render it in the current mode.
    pub fn render(&self) -> Result<String> {
        let tree = build_tree(self.fs.as_ref(), &self.root, &self.filter)?;
        match self.mode {
            DisplayMode::Json => to_json(&tree),
            DisplayMode::Plain => Ok(to_plain(&tree)),
        }
    }

    /// Print the current tree, or the read error.
    pub fn show_tree(&self) {
        match self.render() {
            Ok(rendered) => console::tree(&rendered),
            Err(err) => {
                warn!(root = %self.root.display(), error = %err, "failed to read directory tree");
                console::tree_error(&self.root, &err);
            }
        }
    }

    /// Tell the operator about an admitted change: the whole tree when
    /// `FullTree` is on, otherwise just the path.
    pub fn report_change(&self, change: &WatchEvent) {
        if self.scope.shows_tree() {
            self.show_tree();
        } else {
            console::changed_file(change);
        }
    }
}
