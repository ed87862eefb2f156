// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`launch`] describes what to run ([`LaunchSpec`]).
//! - [`spawner`] provides the `ProcessSpawner` trait and the production
//!   [`RealSpawner`] built on `tokio::process`; tests replace it with a fake.
//! - [`child_runner`] is the per-child task that forwards the termination
//!   request and reports the exit.
//! - [`supervisor`] owns the single [`ManagedProcess`] and its start/stop
//!   protocol.

pub mod child_runner;
pub mod launch;
pub mod spawner;
pub mod supervisor;

pub use launch::{LaunchSpec, infer_interpreter};
pub use spawner::{ExitOutcome, ProcessSpawner, RealSpawner, SpawnedChild};
pub use supervisor::{ManagedProcess, ProcessSupervisor, StopFuture};
