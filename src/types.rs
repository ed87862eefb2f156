// src/types.rs

use std::fmt;

use serde::Deserialize;

/// How the directory tree is rendered when it is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Pretty-printed JSON object (default).
    #[default]
    Json,
    /// Indented listing, directories suffixed with `/`.
    Plain,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Json => DisplayMode::Plain,
            DisplayMode::Plain => DisplayMode::Json,
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayMode::Json => f.write_str("JSON"),
            DisplayMode::Plain => f.write_str("normal"),
        }
    }
}

/// What is printed when a watched file changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WatchScope {
    /// Print only the path of the changed file (default).
    #[default]
    ChangedFiles,
    /// Re-render the whole watched directory tree.
    FullTree,
}

impl WatchScope {
    pub fn toggled(self) -> Self {
        match self {
            WatchScope::ChangedFiles => WatchScope::FullTree,
            WatchScope::FullTree => WatchScope::ChangedFiles,
        }
    }

    pub fn shows_tree(self) -> bool {
        matches!(self, WatchScope::FullTree)
    }
}

/// Coarse classification of a filesystem change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
    Renamed,
    Other,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Created => "created",
            ChangeKind::Modified => "modified",
            ChangeKind::Removed => "removed",
            ChangeKind::Renamed => "renamed",
            ChangeKind::Other => "changed",
        };
        f.write_str(s)
    }
}
