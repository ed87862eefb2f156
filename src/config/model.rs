// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::DisplayMode;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [watch]
/// root = "."
/// extensions = ["js", "json", "html", "css", "md"]
/// ignore = ["**/node_modules/**", "**/.env"]
/// delay_ms = 1000
///
/// [process]
/// exec = "node"
/// args = ["--port", "8080"]
///
/// [display]
/// mode = "json"
/// tree = false
/// ```
///
/// All sections are optional and have the defaults of the classic
/// "restart my node server" workflow.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// What to watch, from `[watch]`.
    #[serde(default)]
    pub watch: WatchSection,

    /// How to launch the target, from `[process]`.
    #[serde(default)]
    pub process: ProcessSection,

    /// Initial display toggles, from `[display]`.
    #[serde(default)]
    pub display: DisplaySection,
}

/// Validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>` (see
/// `config::validate`), so holders can rely on non-empty extensions, a
/// positive delay and compilable ignore globs.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    watch: WatchSection,
    process: ProcessSection,
    display: DisplaySection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        watch: WatchSection,
        process: ProcessSection,
        display: DisplaySection,
    ) -> Self {
        Self {
            watch,
            process,
            display,
        }
    }

    pub fn watch(&self) -> &WatchSection {
        &self.watch
    }

    pub fn process(&self) -> &ProcessSection {
        &self.process
    }

    pub fn display(&self) -> &DisplaySection {
        &self.display
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Directory watched recursively. Defaults to the current directory.
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Extensions (without the dot) whose changes restart the target.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Glob patterns, relative to `root`, that never trigger a restart.
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,

    /// Quiet period after the last change before restarting.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            root: None,
            extensions: default_extensions(),
            ignore: default_ignore(),
            delay_ms: default_delay_ms(),
        }
    }
}

pub fn default_extensions() -> Vec<String> {
    ["js", "json", "html", "css", "png", "jpg", "jpeg", "gif", "svg", "md"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn default_ignore() -> Vec<String> {
    [
        "**/node_modules/**",
        "**/.git/**",
        "**/.env",
        "**/.gitignore",
        "**/*.txt",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_delay_ms() -> u64 {
    1000
}

/// `[process]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProcessSection {
    /// Interpreter for the target. Inferred from the target's extension
    /// when absent.
    #[serde(default)]
    pub exec: Option<String>,

    /// Extra arguments appended after the target path.
    #[serde(default)]
    pub args: Vec<String>,
}

/// `[display]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DisplaySection {
    #[serde(default)]
    pub mode: DisplayMode,

    /// Start with the full tree display enabled.
    #[serde(default)]
    pub tree: bool,
}
