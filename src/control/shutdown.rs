// src/control/shutdown.rs

//! Termination-signal handling.
//!
//! Signals never stop the child directly; they become
//! `RuntimeEvent::ShutdownRequested` and the runtime's coordinator makes
//! repeated requests harmless.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::{RuntimeEvent, ShutdownReason};

/// Listen for Ctrl-C (and SIGTERM on unix) for the life of the program,
/// forwarding every occurrence to the runtime.
pub fn spawn_signal_listener(tx: mpsc::Sender<RuntimeEvent>) {
    tokio::spawn(async move {
        #[cfg(unix)]
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(stream) => Some(stream),
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                    None
                }
            };

        loop {
            #[cfg(unix)]
            let reason = tokio::select! {
                res = tokio::signal::ctrl_c() => match res {
                    Ok(()) => ShutdownReason::Interrupt,
                    Err(err) => {
                        warn!(error = %err, "failed to listen for Ctrl+C");
                        return;
                    }
                },
                Some(()) = recv_sigterm(&mut sigterm) => ShutdownReason::Terminate,
            };

            #[cfg(not(unix))]
            let reason = match tokio::signal::ctrl_c().await {
                Ok(()) => ShutdownReason::Interrupt,
                Err(err) => {
                    warn!(error = %err, "failed to listen for Ctrl+C");
                    return;
                }
            };

            debug!(%reason, "termination signal received");
            if tx.send(RuntimeEvent::ShutdownRequested { reason }).await.is_err() {
                debug!("runtime gone; signal listener stopped");
                return;
            }
        }
    });
}

#[cfg(unix)]
async fn recv_sigterm(stream: &mut Option<tokio::signal::unix::Signal>) -> Option<()> {
    match stream {
        Some(stream) => stream.recv().await,
        None => std::future::pending().await,
    }
}
