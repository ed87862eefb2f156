// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the effective configuration for a CLI invocation.
///
/// - An explicit `--config` must exist.
/// - Otherwise `SyncServer.toml` in the current directory is used when present.
/// - Otherwise built-in defaults apply.
///
/// CLI flags are layered on top before validation, so a bad `--ext` or
/// `--ignore` is reported the same way as a bad config value.
pub fn resolve_config(args: &CliArgs) -> Result<ConfigFile> {
    let mut raw = match &args.config {
        Some(path) => load_from_path(path)?,
        None => {
            let default_path = default_config_path();
            if default_path.is_file() {
                debug!(path = ?default_path, "using config file from current directory");
                load_from_path(&default_path)?
            } else {
                RawConfigFile::default()
            }
        }
    };

    raw.apply_cli_overrides(args);
    ConfigFile::try_from(raw)
}

/// Default config location: `SyncServer.toml` in the current directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("SyncServer.toml")
}

impl RawConfigFile {
    /// Layer command-line flags over values read from the file.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(root) = &args.watch {
            self.watch.root = Some(root.clone());
        }
        if !args.extensions.is_empty() {
            self.watch.extensions = args.extensions.clone();
        }
        self.watch.ignore.extend(args.ignore.iter().cloned());
        if let Some(delay) = args.delay {
            self.watch.delay_ms = delay;
        }
        if let Some(exec) = &args.exec {
            self.process.exec = Some(exec.clone());
        }
        if !args.target_args.is_empty() {
            self.process.args = args.target_args.clone();
        }
        if args.tree {
            self.display.tree = true;
        }
    }
}
