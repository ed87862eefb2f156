// src/exec/supervisor.rs

//! Lifecycle of the single supervised child process.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

use crate::engine::RuntimeEvent;
use crate::errors::{Result, SupervisorError};
use crate::exec::launch::LaunchSpec;
use crate::exec::spawner::{ExitOutcome, ProcessSpawner};

/// Future returned by [`ProcessSupervisor::stop`]; resolves once the child
/// has confirmed exit.
pub type StopFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// The currently supervised child.
///
/// `closed` is flipped to `true` exactly once, by the exit observer, when the
/// spawner reports the child's terminal outcome (or immediately if the launch
/// itself failed).
#[derive(Debug)]
pub struct ManagedProcess {
    generation: u64,
    spec: LaunchSpec,
    pid: Option<u32>,
    closed: watch::Receiver<bool>,
    terminate: Option<oneshot::Sender<()>>,
}

impl ManagedProcess {
    /// Monotonic per-supervisor counter, starting at 1.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn spec(&self) -> &LaunchSpec {
        &self.spec
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// True once a termination request has been sent (or there was never a
    /// child to send it to).
    pub fn termination_requested(&self) -> bool {
        self.terminate.is_none()
    }
}

/// Owns exactly one [`ManagedProcess`] at a time.
pub struct ProcessSupervisor<S: ProcessSpawner> {
    spawner: S,
    events: mpsc::Sender<RuntimeEvent>,
    current: Option<ManagedProcess>,
    last_generation: u64,
}

impl<S: ProcessSpawner> std::fmt::Debug for ProcessSupervisor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessSupervisor")
            .field("current", &self.current)
            .field("last_generation", &self.last_generation)
            .finish_non_exhaustive()
    }
}

impl<S: ProcessSpawner> ProcessSupervisor<S> {
    /// `events` receives one `RuntimeEvent::ProcessExited` per started child.
    pub fn new(spawner: S, events: mpsc::Sender<RuntimeEvent>) -> Self {
        Self {
            spawner,
            events,
            current: None,
            last_generation: 0,
        }
    }

    pub fn current(&self) -> Option<&ManagedProcess> {
        self.current.as_ref()
    }

    /// True while a child is running (started and not yet confirmed closed).
    pub fn is_live(&self) -> bool {
        self.current.as_ref().is_some_and(|p| !p.is_closed())
    }

    /// Launch a new child for `spec`.
    ///
    /// Refuses with [`SupervisorError::ProcessStillLive`] while the previous
    /// child has not confirmed exit. A launch failure is *not* an error here:
    /// the new process is recorded as already closed, the failure is logged
    /// and reported as `ProcessExited { outcome: LaunchFailed }`.
    pub fn start(&mut self, spec: LaunchSpec) -> Result<&ManagedProcess> {
        if let Some(previous) = &self.current {
            if !previous.is_closed() {
                return Err(SupervisorError::ProcessStillLive {
                    generation: previous.generation,
                });
            }
        }

        self.last_generation += 1;
        let generation = self.last_generation;
        let (closed_tx, closed_rx) = watch::channel(false);

        let (pid, terminate, exited) = match self.spawner.spawn(&spec) {
            Ok(child) => {
                info!(generation, pid = ?child.pid, cmd = %spec, "started child process");
                (child.pid, Some(child.terminate), child.exited)
            }
            Err(err) => {
                error!(generation, cmd = %spec, error = %err, "failed to launch child process");
                closed_tx.send_replace(true);
                let (tx, rx) = oneshot::channel();
                let _ = tx.send(ExitOutcome::LaunchFailed(err.to_string()));
                (None, None, rx)
            }
        };

        spawn_exit_observer(generation, exited, closed_tx, self.events.clone());

        // The previous handle (already closed) is discarded here.
        let process = self.current.insert(ManagedProcess {
            generation,
            spec,
            pid,
            closed: closed_rx,
            terminate,
        });
        Ok(process)
    }

    /// Ask the current child to terminate and return a future that resolves
    /// once it has exited.
    ///
    /// - No child, or child already closed: resolves immediately.
    /// - The termination request is sent at most once per child; calling
    ///   `stop` again while a stop is in flight only waits.
    pub fn stop(&mut self) -> StopFuture {
        let Some(process) = self.current.as_mut() else {
            debug!("stop requested with no child process; nothing to do");
            return Box::pin(std::future::ready(()));
        };

        if process.is_closed() {
            debug!(
                generation = process.generation,
                "stop requested but child already closed"
            );
            return Box::pin(std::future::ready(()));
        }

        match process.terminate.take() {
            Some(terminate) => {
                info!(
                    generation = process.generation,
                    pid = ?process.pid,
                    "requesting child termination"
                );
                if terminate.send(()).is_err() {
                    debug!(
                        generation = process.generation,
                        "child runner already finished while requesting termination"
                    );
                }
            }
            None => {
                debug!(
                    generation = process.generation,
                    "termination already requested; waiting for exit"
                );
            }
        }

        let mut closed = process.closed.clone();
        Box::pin(async move {
            while !*closed.borrow_and_update() {
                if closed.changed().await.is_err() {
                    // Observer dropped its sender: nothing will ever report
                    // this child again, treat it as gone.
                    break;
                }
            }
        })
    }
}

/// Await the single terminal outcome of one child, mark it closed and
/// forward `ProcessExited` to the runtime.
fn spawn_exit_observer(
    generation: u64,
    exited: oneshot::Receiver<ExitOutcome>,
    closed_tx: watch::Sender<bool>,
    events: mpsc::Sender<RuntimeEvent>,
) {
    tokio::spawn(async move {
        let outcome = exited.await.unwrap_or_else(|_| {
            ExitOutcome::WaitFailed("child runner ended without reporting an exit".to_string())
        });

        closed_tx.send_replace(true);

        match &outcome {
            ExitOutcome::Exited { code } => {
                info!(generation, ?code, "child process closed");
            }
            ExitOutcome::LaunchFailed(err) => {
                error!(generation, error = %err, "child process never started");
            }
            ExitOutcome::WaitFailed(err) => {
                warn!(generation, error = %err, "child process state lost; treating as closed");
            }
        }

        if events
            .send(RuntimeEvent::ProcessExited {
                generation,
                outcome,
            })
            .await
            .is_err()
        {
            debug!(generation, "runtime gone before child exit could be reported");
        }
    });
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::exec::spawner::SpawnedChild;

    /// Spawner whose children exit as soon as they are asked to terminate.
    #[derive(Default)]
    struct ObedientSpawner {
        terminations: Arc<Mutex<usize>>,
        fail: bool,
    }

    impl ProcessSpawner for ObedientSpawner {
        fn spawn(&mut self, _spec: &LaunchSpec) -> io::Result<SpawnedChild> {
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::NotFound, "no such program"));
            }
            let (terminate_tx, terminate_rx) = oneshot::channel::<()>();
            let (exited_tx, exited_rx) = oneshot::channel();
            let terminations = Arc::clone(&self.terminations);
            tokio::spawn(async move {
                if terminate_rx.await.is_ok() {
                    *terminations.lock().unwrap() += 1;
                    let _ = exited_tx.send(ExitOutcome::Exited { code: None });
                }
            });
            Ok(SpawnedChild {
                pid: Some(4242),
                terminate: terminate_tx,
                exited: exited_rx,
            })
        }
    }

    fn spec() -> LaunchSpec {
        LaunchSpec::new("node", vec!["app.js".to_string()])
    }

    #[tokio::test]
    async fn stop_without_child_resolves_immediately() {
        let (tx, _rx) = mpsc::channel(8);
        let mut supervisor = ProcessSupervisor::new(ObedientSpawner::default(), tx);
        supervisor.stop().await;
        supervisor.stop().await;
        assert!(!supervisor.is_live());
    }

    #[tokio::test]
    async fn start_refuses_while_previous_child_is_live() {
        let (tx, _rx) = mpsc::channel(8);
        let mut supervisor = ProcessSupervisor::new(ObedientSpawner::default(), tx);

        let generation = supervisor.start(spec()).unwrap().generation();
        assert_eq!(generation, 1);

        let err = supervisor.start(spec()).unwrap_err();
        assert!(matches!(err, SupervisorError::ProcessStillLive { generation: 1 }));
    }

    #[tokio::test]
    async fn stop_waits_for_confirmed_exit_and_reports_it() {
        let (tx, mut rx) = mpsc::channel(8);
        let spawner = ObedientSpawner::default();
        let terminations = Arc::clone(&spawner.terminations);
        let mut supervisor = ProcessSupervisor::new(spawner, tx);

        supervisor.start(spec()).unwrap();
        assert!(supervisor.is_live());

        supervisor.stop().await;
        assert!(!supervisor.is_live());
        assert_eq!(*terminations.lock().unwrap(), 1);

        match rx.recv().await {
            Some(RuntimeEvent::ProcessExited { generation, outcome }) => {
                assert_eq!(generation, 1);
                assert_eq!(outcome, ExitOutcome::Exited { code: None });
            }
            other => panic!("unexpected event: {other:?}"),
        }

        // The next child can start now.
        assert_eq!(supervisor.start(spec()).unwrap().generation(), 2);
    }

    #[tokio::test]
    async fn repeated_stop_sends_a_single_termination_request() {
        let (tx, _rx) = mpsc::channel(8);
        let spawner = ObedientSpawner::default();
        let terminations = Arc::clone(&spawner.terminations);
        let mut supervisor = ProcessSupervisor::new(spawner, tx);

        supervisor.start(spec()).unwrap();
        let first = supervisor.stop();
        assert!(supervisor.current().unwrap().termination_requested());
        let second = supervisor.stop();
        first.await;
        second.await;

        assert_eq!(*terminations.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn launch_failure_is_closed_and_reported_not_returned() {
        let (tx, mut rx) = mpsc::channel(8);
        let spawner = ObedientSpawner {
            fail: true,
            ..ObedientSpawner::default()
        };
        let mut supervisor = ProcessSupervisor::new(spawner, tx);

        let process = supervisor.start(spec()).unwrap();
        assert!(process.is_closed());
        assert!(!supervisor.is_live());

        match rx.recv().await {
            Some(RuntimeEvent::ProcessExited {
                outcome: ExitOutcome::LaunchFailed(msg),
                ..
            }) => assert!(msg.contains("no such program")),
            other => panic!("unexpected event: {other:?}"),
        }

        // Stop is a no-op and a retry may start right away.
        supervisor.stop().await;
        assert!(supervisor.start(spec()).is_ok());
    }
}
