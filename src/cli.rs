// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `syncserver`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "syncserver",
    version,
    about = "Restart a development server whenever its source tree changes.",
    long_about = None
)]
pub struct CliArgs {
    /// Script or executable to supervise.
    ///
    /// Without a target the supervisor prints a hint and exits.
    #[arg(value_name = "TARGET")]
    pub target: Option<PathBuf>,

    /// Extra arguments passed to the target (after `--`).
    #[arg(last = true, value_name = "ARGS")]
    pub target_args: Vec<String>,

    /// Path to an optional config file (TOML).
    ///
    /// Default: `SyncServer.toml` in the current directory, if it exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory to watch (recursively).
    #[arg(long, value_name = "DIR")]
    pub watch: Option<PathBuf>,

    /// File extensions that trigger a restart, e.g. `--ext js,json`.
    #[arg(long = "ext", value_name = "EXT", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Extra glob patterns to ignore (added to the configured ignore set).
    #[arg(long, value_name = "GLOB")]
    pub ignore: Vec<String>,

    /// Quiet period in milliseconds before a burst of changes restarts the target.
    #[arg(long, value_name = "MS")]
    pub delay: Option<u64>,

    /// Interpreter used to run the target (inferred from its extension if omitted).
    #[arg(long, value_name = "PROGRAM")]
    pub exec: Option<String>,

    /// Start with the full directory tree display enabled.
    #[arg(long)]
    pub tree: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SYNCSERVER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the settings, but don't watch or run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
