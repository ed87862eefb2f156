// src/engine/coordinator.rs

//! Pure restart-coordination state machine.
//!
//! The coordinator decides *what* should happen to the managed process; the
//! async shell (`engine::runtime::Runtime`) performs it and reports back:
//!
//! ```text
//!            request_restart             stop_resolved
//!   Idle ─────────────────────▶ Stopping ──────────────▶ Starting
//!    ▲                                                     │
//!    └──────────────────────── start_issued ───────────────┘
//! ```
//!
//! Invariants:
//! - `StartProcess` is only ever emitted after the previous `StopProcess`
//!   has resolved (or at boot, when there is no previous process).
//! - At most one `StopProcess` is outstanding at a time.
//! - Once shutdown is requested, no further `StartProcess` is emitted and
//!   the last command is `Exit`.
//!
//! No Tokio types, channels or IO in here.

use tracing::{debug, info};

use crate::engine::{RestartReason, ShutdownReason};

/// Phase of the restart cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartState {
    /// Child started (or exited on its own); nothing in flight.
    Idle,
    /// A stop request is in flight; waiting for confirmed exit.
    Stopping,
    /// A new child is being launched.
    Starting,
}

/// Command produced by the coordinator, executed by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorCommand {
    /// Ask the current child to stop; report back via `stop_resolved`.
    StopProcess,
    /// Launch a new child; report back via `start_issued`.
    StartProcess,
    /// Leave the runtime loop.
    Exit,
}

/// Decision returned by the coordinator after each input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorStep {
    pub commands: Vec<CoordinatorCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoordinatorStep {
    /// No commands; keep running.
    pub fn none() -> Self {
        Self {
            commands: Vec::new(),
            keep_running: true,
        }
    }

    fn command(command: CoordinatorCommand) -> Self {
        Self {
            commands: vec![command],
            keep_running: true,
        }
    }

    fn exit() -> Self {
        Self {
            commands: vec![CoordinatorCommand::Exit],
            keep_running: false,
        }
    }
}

#[derive(Debug)]
pub struct RestartCoordinator {
    state: RestartState,
    /// A restart arrived while `Starting`; run it once the start is issued.
    restart_queued: bool,
    /// Latched by the first shutdown request.
    shutdown: Option<ShutdownReason>,
    /// Completed stop→start cycles (for logging and tests).
    cycles: u64,
}

impl Default for RestartCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RestartCoordinator {
    pub fn new() -> Self {
        Self {
            state: RestartState::Idle,
            restart_queued: false,
            shutdown: None,
            cycles: 0,
        }
    }

    pub fn state(&self) -> RestartState {
        self.state
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_some()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// True when a child exit right now is the result of our own stop
    /// request rather than the child ending on its own.
    pub fn exit_expected(&self) -> bool {
        self.state == RestartState::Stopping || self.shutdown.is_some()
    }

    /// Launch the first child.
    pub fn boot(&mut self) -> CoordinatorStep {
        debug!("booting: starting first child");
        self.state = RestartState::Starting;
        CoordinatorStep::command(CoordinatorCommand::StartProcess)
    }

    /// A debounced change or an operator asked for a restart.
    pub fn request_restart(&mut self, reason: RestartReason) -> CoordinatorStep {
        if let Some(shutdown) = self.shutdown {
            debug!(%reason, %shutdown, "restart requested during shutdown; ignoring");
            return CoordinatorStep::none();
        }

        match self.state {
            RestartState::Idle => {
                info!(%reason, "restart requested; stopping current child");
                self.state = RestartState::Stopping;
                CoordinatorStep::command(CoordinatorCommand::StopProcess)
            }
            RestartState::Stopping => {
                // The replacement child has not been spawned yet, so it will
                // already see whatever prompted this request.
                debug!(%reason, "restart already in flight; coalescing request");
                CoordinatorStep::none()
            }
            RestartState::Starting => {
                debug!(%reason, "restart requested while starting; queued");
                self.restart_queued = true;
                CoordinatorStep::none()
            }
        }
    }

    /// The in-flight stop has resolved: the previous child is closed.
    pub fn stop_resolved(&mut self) -> CoordinatorStep {
        if self.state != RestartState::Stopping {
            debug!(state = ?self.state, "stop resolved outside Stopping; ignoring");
            return CoordinatorStep::none();
        }

        if let Some(reason) = self.shutdown {
            info!(%reason, "child stopped; exiting");
            self.state = RestartState::Idle;
            return CoordinatorStep::exit();
        }

        self.state = RestartState::Starting;
        CoordinatorStep::command(CoordinatorCommand::StartProcess)
    }

    /// The runtime has issued the launch (the handle exists; readiness is
    /// not awaited).
    pub fn start_issued(&mut self) -> CoordinatorStep {
        if self.state != RestartState::Starting {
            debug!(state = ?self.state, "start issued outside Starting; ignoring");
            return CoordinatorStep::none();
        }

        self.state = RestartState::Idle;
        self.cycles += 1;

        if self.shutdown.is_some() {
            debug!("shutdown requested while starting; stopping the new child");
            self.state = RestartState::Stopping;
            return CoordinatorStep::command(CoordinatorCommand::StopProcess);
        }

        if std::mem::take(&mut self.restart_queued) {
            debug!("running queued restart");
            self.state = RestartState::Stopping;
            return CoordinatorStep::command(CoordinatorCommand::StopProcess);
        }

        CoordinatorStep::none()
    }

    /// Stop the child and leave. Safe to call any number of times.
    pub fn request_shutdown(&mut self, reason: ShutdownReason) -> CoordinatorStep {
        if let Some(first) = self.shutdown {
            debug!(%reason, %first, "shutdown already in progress");
            return CoordinatorStep::none();
        }

        info!(%reason, state = ?self.state, "shutdown requested");
        self.shutdown = Some(reason);
        self.restart_queued = false;

        match self.state {
            RestartState::Idle => {
                self.state = RestartState::Stopping;
                CoordinatorStep::command(CoordinatorCommand::StopProcess)
            }
            // The in-flight stop resolves into `Exit`; `start_issued` turns
            // a pending start into a stop.
            RestartState::Stopping | RestartState::Starting => CoordinatorStep::none(),
        }
    }
}
