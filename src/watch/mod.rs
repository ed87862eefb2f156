// src/watch/mod.rs

//! File watching.
//!
//! This module is responsible for:
//! - Compiling the watched-extension and ignore glob sets ([`WatchFilter`]).
//! - Wiring up a recursive filesystem watcher (`notify`) and turning its raw
//!   events into root-relative [`WatchEvent`]s.
//!
//! It does **not** decide when to restart; that is the debouncer's job.

pub mod event;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use event::WatchEvent;
pub use patterns::WatchFilter;
pub use watcher::{WatcherHandle, spawn_watcher};
