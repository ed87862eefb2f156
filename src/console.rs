// src/console.rs

//! Operator-facing notices on stdout.
//!
//! Diagnostics go through `tracing` (stderr); these lines are the tool's
//! conversation with the person at the terminal.

use std::path::Path;
use std::time::Duration;

use crate::engine::{RestartReason, ShutdownReason};
use crate::exec::{ExitOutcome, LaunchSpec};
use crate::types::{DisplayMode, WatchScope};
use crate::watch::WatchEvent;

const PREFIX: &str = "[syncserver]";

const COMMANDS: &[(&str, &str)] = &[
    ("rs", "restart the process now"),
    ("c", "stop the process and exit"),
    ("toggle", "switch the tree format between JSON and normal"),
    ("seeFiles", "switch between changed-file names and the full tree"),
    ("info", "show session information"),
    ("help", "show this list"),
];

pub fn banner(launch: &LaunchSpec, root: &Path, extensions: &[String]) {
    println!("{PREFIX} syncserver v{}", env!("CARGO_PKG_VERSION"));
    println!("{PREFIX} watching {} ({})", root.display(), extensions.join(", "));
    println!("{PREFIX} starting `{launch}`");
    help();
}

pub fn help() {
    println!("{PREFIX} commands:");
    for (token, what) in COMMANDS {
        println!("  {token:<9} {what}");
    }
}

pub fn usage() {
    println!("usage: syncserver [OPTIONS] <TARGET> [-- ARGS...]");
    println!("       run `syncserver --help` for all options");
}

pub fn info(launch: &LaunchSpec, root: &Path, delay: Duration, extensions: &[String]) {
    println!("{PREFIX} syncserver v{}", env!("CARGO_PKG_VERSION"));
    println!("  command:    {launch}");
    println!("  root:       {}", root.display());
    println!("  delay:      {} ms", delay.as_millis());
    println!("  extensions: {}", extensions.join(", "));
}

pub fn restarting(reason: RestartReason) {
    match reason {
        RestartReason::FileChange => println!("{PREFIX} restarting due to changes..."),
        RestartReason::Operator => println!("{PREFIX} restarting..."),
    }
}

pub fn child_started(generation: u64, launch: &LaunchSpec) {
    if generation > 1 {
        println!("{PREFIX} started `{launch}`");
    }
}

pub fn child_exited(outcome: &ExitOutcome) {
    println!("{PREFIX} process {outcome}; waiting for changes before restart");
}

pub fn launch_failed(launch: &LaunchSpec, err: &str) {
    println!("{PREFIX} failed to start `{launch}`: {err}");
    println!("{PREFIX} waiting for changes before retrying");
}

pub fn shutting_down(reason: ShutdownReason) {
    println!("{PREFIX} shutting down ({reason})...");
}

pub fn shutdown_complete() {
    println!("{PREFIX} process stopped, bye");
}

pub fn display_mode(mode: DisplayMode) {
    println!("{PREFIX} display format toggled to {mode}");
}

pub fn watch_scope(scope: WatchScope) {
    let state = if scope.shows_tree() { "enabled" } else { "disabled" };
    println!("{PREFIX} directory tree display {state}");
}

pub fn changed_file(change: &WatchEvent) {
    println!("{PREFIX} {} {}", change.kind, change.path);
}

pub fn tree(rendered: &str) {
    println!("{}", rendered.trim_end());
}

pub fn tree_error(root: &Path, err: &anyhow::Error) {
    println!("{PREFIX} error reading directory {}: {err:#}", root.display());
}
