use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::Instant;
use syncserver::exec::{ExitOutcome, LaunchSpec, ProcessSpawner, SpawnedChild};

/// One recorded spawn.
#[derive(Debug, Clone)]
pub struct SpawnRecord {
    pub spec: LaunchSpec,
    pub at: Instant,
    /// Number of fake children still running right before this spawn.
    pub live_before: usize,
}

#[derive(Debug, Default)]
struct State {
    spawns: Vec<SpawnRecord>,
    live: usize,
    terminations: usize,
    fail_launches: bool,
    stop_delay: Duration,
    /// Senders that let a test end a child "on its own".
    exits: Vec<Option<oneshot::Sender<i32>>>,
}

/// A fake spawner that:
/// - records every spawn with the (possibly paused) Tokio clock
/// - tracks how many fake children are alive, to check that a new child is
///   never started while the previous one runs
/// - ends a child with `code: None` when it is asked to terminate, after
///   an optional shutdown delay
/// - lets tests end a child with an exit code via [`FakeSpawner::exit_child`]
#[derive(Debug, Clone, Default)]
pub struct FakeSpawner {
    state: Arc<Mutex<State>>,
}

impl FakeSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Make every following spawn fail as if the program did not exist.
    pub fn fail_launches(&self, fail: bool) {
        self.lock().fail_launches = fail;
    }

    /// How long a child takes to exit once asked to terminate.
    pub fn stop_delay(&self, delay: Duration) {
        self.lock().stop_delay = delay;
    }

    pub fn spawns(&self) -> Vec<SpawnRecord> {
        self.lock().spawns.clone()
    }

    pub fn spawn_count(&self) -> usize {
        self.lock().spawns.len()
    }

    /// Children currently running.
    pub fn live(&self) -> usize {
        self.lock().live
    }

    /// Termination requests received across all children.
    pub fn terminations(&self) -> usize {
        self.lock().terminations
    }

    /// True when every spawn happened with no other fake child alive.
    pub fn never_overlapped(&self) -> bool {
        self.lock().spawns.iter().all(|s| s.live_before == 0)
    }

    /// End the `index`-th spawned child (0-based) with `code`, as if it
    /// exited by itself. Returns false if it is already gone.
    pub fn exit_child(&self, index: usize, code: i32) -> bool {
        let sender = self
            .lock()
            .exits
            .get_mut(index)
            .and_then(Option::take);
        match sender {
            Some(tx) => tx.send(code).is_ok(),
            None => false,
        }
    }
}

impl ProcessSpawner for FakeSpawner {
    fn spawn(&mut self, spec: &LaunchSpec) -> io::Result<SpawnedChild> {
        let (terminate_tx, terminate_rx) = oneshot::channel::<()>();
        let (exited_tx, exited_rx) = oneshot::channel::<ExitOutcome>();
        let (self_exit_tx, self_exit_rx) = oneshot::channel::<i32>();

        let stop_delay;
        {
            let mut state = self.lock();
            if state.fail_launches {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{}: not found", spec.program),
                ));
            }
            stop_delay = state.stop_delay;
            let live_before = state.live;
            state.spawns.push(SpawnRecord {
                spec: spec.clone(),
                at: Instant::now(),
                live_before,
            });
            state.live += 1;
            state.exits.push(Some(self_exit_tx));
        }

        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let outcome = tokio::select! {
                Ok(()) = terminate_rx => {
                    state.lock().unwrap().terminations += 1;
                    if !stop_delay.is_zero() {
                        tokio::time::sleep(stop_delay).await;
                    }
                    ExitOutcome::Exited { code: None }
                }
                Ok(code) = self_exit_rx => ExitOutcome::Exited { code: Some(code) },
                else => ExitOutcome::Exited { code: None },
            };
            state.lock().unwrap().live -= 1;
            let _ = exited_tx.send(outcome);
        });

        Ok(SpawnedChild {
            pid: None,
            terminate: terminate_tx,
            exited: exited_rx,
        })
    }
}
