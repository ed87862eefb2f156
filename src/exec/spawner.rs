// src/exec/spawner.rs

//! Pluggable process-spawning abstraction.
//!
//! The supervisor talks to a `ProcessSpawner` instead of `tokio::process`
//! directly. This makes it easy to swap in a fake spawner in tests while
//! keeping the production implementation in [`RealSpawner`].
//!
//! Contract: every successful `spawn` yields exactly one [`ExitOutcome`] on
//! `exited`, and the child reacts to (at most) one termination request sent
//! on `terminate`.

use std::fmt;
use std::io;
use std::process::Stdio;

use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::debug;

use crate::exec::child_runner::run_child;
use crate::exec::launch::LaunchSpec;

/// Terminal notification for one spawned child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    /// The process exited; `code` is `None` when it was ended by a signal.
    Exited { code: Option<i32> },
    /// The program could not be started at all.
    LaunchFailed(String),
    /// Waiting on the process failed; its state is unknown but it is no
    /// longer tracked.
    WaitFailed(String),
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Exited { code: Some(code) } => write!(f, "exited with code {code}"),
            ExitOutcome::Exited { code: None } => f.write_str("terminated by signal"),
            ExitOutcome::LaunchFailed(err) => write!(f, "failed to launch: {err}"),
            ExitOutcome::WaitFailed(err) => write!(f, "lost track of process: {err}"),
        }
    }
}

/// Handles returned for a freshly spawned child.
#[derive(Debug)]
pub struct SpawnedChild {
    pub pid: Option<u32>,
    /// Send `()` to ask the child to terminate.
    pub terminate: oneshot::Sender<()>,
    /// Resolves exactly once, when the child is gone.
    pub exited: oneshot::Receiver<ExitOutcome>,
}

/// Trait abstracting how the supervised child is launched.
///
/// Must be called from within a Tokio runtime; implementations are free to
/// spawn background tasks.
pub trait ProcessSpawner: Send {
    fn spawn(&mut self, spec: &LaunchSpec) -> io::Result<SpawnedChild>;
}

/// Production spawner backed by `tokio::process`.
///
/// The child inherits stdin/stdout/stderr so it behaves exactly as if it had
/// been started from the operator's shell. `kill_on_drop(true)` guarantees
/// the child does not outlive the supervisor even on an error path.
#[derive(Debug, Clone, Default)]
pub struct RealSpawner;

impl ProcessSpawner for RealSpawner {
    fn spawn(&mut self, spec: &LaunchSpec) -> io::Result<SpawnedChild> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let child = cmd.spawn()?;
        let pid = child.id();
        debug!(?pid, cmd = %spec, "spawned child process");

        let (terminate_tx, terminate_rx) = oneshot::channel::<()>();
        let (exited_tx, exited_rx) = oneshot::channel::<ExitOutcome>();

        tokio::spawn(run_child(child, terminate_rx, exited_tx));

        Ok(SpawnedChild {
            pid,
            terminate: terminate_tx,
            exited: exited_rx,
        })
    }
}
