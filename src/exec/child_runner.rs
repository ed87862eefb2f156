// src/exec/child_runner.rs

//! Per-child runner task.

use tokio::process::Child;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::exec::spawner::ExitOutcome;

/// Wait for `child` to exit, forwarding a termination request if one
/// arrives first, then report the outcome exactly once on `exited_tx`.
///
/// A termination request is sent to the child once; there is no forced-kill
/// escalation, so a child that ignores SIGTERM keeps the runner waiting.
pub async fn run_child(
    mut child: Child,
    mut terminate_rx: oneshot::Receiver<()>,
    exited_tx: oneshot::Sender<ExitOutcome>,
) {
    let pid = child.id();

    // Either the process exits on its own, or we are asked to stop it.
    let status = tokio::select! {
        status = child.wait() => status,

        request = &mut terminate_rx => {
            match request {
                Ok(()) => request_termination(&mut child),
                Err(_) => {
                    debug!(?pid, "termination handle dropped; waiting for child to exit on its own");
                }
            }
            child.wait().await
        }
    };

    let outcome = match status {
        Ok(status) => {
            info!(?pid, exit_code = ?status.code(), success = status.success(), "child process exited");
            ExitOutcome::Exited {
                code: status.code(),
            }
        }
        Err(err) => {
            warn!(?pid, error = %err, "failed waiting for child process");
            ExitOutcome::WaitFailed(err.to_string())
        }
    };

    if exited_tx.send(outcome).is_err() {
        debug!(?pid, "exit observer gone before child exit was reported");
    }
}

#[cfg(unix)]
fn request_termination(child: &mut Child) {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        debug!("child already reaped; nothing to terminate");
        return;
    };

    match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        Ok(()) => debug!(pid, "sent SIGTERM to child"),
        Err(Errno::ESRCH) => debug!(pid, "child already exited before SIGTERM"),
        Err(err) => {
            warn!(pid, error = %err, "failed to send SIGTERM; killing child instead");
            if let Err(e) = child.start_kill() {
                warn!(pid, error = %e, "failed to kill child process");
            }
        }
    }
}

#[cfg(not(unix))]
fn request_termination(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        warn!(pid = ?child.id(), error = %e, "failed to terminate child process");
    }
}
