// src/lib.rs

pub mod cli;
pub mod config;
pub mod console;
pub mod control;
pub mod display;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, resolve_config};
use crate::display::TreeDisplay;
use crate::engine::{ChangeDebouncer, Runtime, RuntimeEvent};
use crate::exec::{LaunchSpec, ProcessSupervisor, RealSpawner};
use crate::fs::RealFileSystem;
use crate::types::WatchScope;
use crate::watch::WatchFilter;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file + CLI overrides)
/// - the filesystem watcher
/// - the operator command reader and the signal listener
/// - the process supervisor, debouncer and runtime loop
pub async fn run(args: CliArgs) -> Result<()> {
    let Some(target) = args.target.clone() else {
        console::usage();
        return Ok(());
    };

    let cfg = resolve_config(&args)?;
    let launch = LaunchSpec::for_target(&target, cfg.process().exec.as_deref(), &cfg.process().args);
    let filter = WatchFilter::from_config(&cfg)?;
    let root = watch_root(&cfg)?;

    if args.dry_run {
        print_dry_run(&cfg, &launch, &root);
        return Ok(());
    }

    console::banner(&launch, &root, filter.extensions());

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    // Dropping the handle stops watching, so keep it for the whole run.
    let watcher = watch::spawn_watcher(&root, rt_tx.clone())
        .with_context(|| format!("watching {}", root.display()))?;
    debug!(root = ?watcher.root(), "watcher ready");

    control::spawn_command_reader(BufReader::new(std::io::stdin()), rt_tx.clone())
        .context("starting operator command reader")?;
    control::spawn_signal_listener(rt_tx.clone());

    let supervisor = ProcessSupervisor::new(RealSpawner, rt_tx);
    let debouncer = ChangeDebouncer::new(
        filter.clone(),
        Duration::from_millis(cfg.watch().delay_ms),
    );
    let scope = if cfg.display().tree {
        WatchScope::FullTree
    } else {
        WatchScope::ChangedFiles
    };
    let display = TreeDisplay::new(
        watcher.root().clone(),
        Arc::new(RealFileSystem),
        filter,
        cfg.display().mode,
        scope,
    );
    if scope.shows_tree() {
        display.show_tree();
    }

    info!(cmd = %launch, root = %root.display(), "supervisor starting");

    let runtime = Runtime::new(supervisor, debouncer, display, launch, rt_rx);
    runtime.run().await?;

    drop(watcher);
    Ok(())
}

/// Directory to watch: `[watch].root` / `--watch`, else the current
/// directory.
fn watch_root(cfg: &ConfigFile) -> Result<PathBuf> {
    match &cfg.watch().root {
        Some(root) => Ok(root.clone()),
        None => std::env::current_dir().context("resolving current directory"),
    }
}

fn print_dry_run(cfg: &ConfigFile, launch: &LaunchSpec, root: &Path) {
    println!("syncserver dry run");
    println!("  command:    {launch}");
    println!("  root:       {}", root.display());
    println!("  extensions: {}", cfg.watch().extensions.join(", "));
    println!("  ignore:     {}", cfg.watch().ignore.join(", "));
    println!("  delay:      {} ms", cfg.watch().delay_ms);
    println!("  display:    {} (tree: {})", cfg.display().mode, cfg.display().tree);
}
