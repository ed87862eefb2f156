// src/engine/mod.rs

//! Orchestration engine for syncserver.
//!
//! This module ties together:
//! - the change debouncer (bursts of file events → one restart)
//! - the restart coordinator (stop → confirmed exit → start)
//! - the main runtime event loop that reacts to:
//!   - file-watch events
//!   - operator commands
//!   - child exit notifications
//!   - shutdown signals
//!
//! The pure state machines live in [`coordinator`] and [`debounce`]; the
//! async/IO shell is implemented in [`runtime`].

use std::fmt;

use crate::control::OperatorCommand;
use crate::exec::ExitOutcome;
use crate::watch::WatchEvent;

/// Why a restart was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartReason {
    /// The debounce window elapsed after admitted file changes.
    FileChange,
    /// The operator typed a restart command.
    Operator,
}

impl fmt::Display for RestartReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestartReason::FileChange => f.write_str("file change"),
            RestartReason::Operator => f.write_str("operator"),
        }
    }
}

/// Why the supervisor is shutting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT / Ctrl-C.
    Interrupt,
    /// SIGTERM.
    Terminate,
    /// The operator typed a stop command.
    Operator,
    /// Every event source went away.
    ChannelClosed,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Interrupt => f.write_str("interrupt"),
            ShutdownReason::Terminate => f.write_str("terminate"),
            ShutdownReason::Operator => f.write_str("operator"),
            ShutdownReason::ChannelClosed => f.write_str("event channel closed"),
        }
    }
}

/// Events flowing into the runtime from watchers, the operator, child
/// processes and signal handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeEvent {
    /// The filesystem watcher observed a change (not yet filtered).
    FileChanged(WatchEvent),
    /// A parsed operator command.
    Operator(OperatorCommand),
    /// A child reached its terminal state.
    ProcessExited { generation: u64, outcome: ExitOutcome },
    /// Graceful shutdown requested.
    ShutdownRequested { reason: ShutdownReason },
}

pub mod coordinator;
pub mod debounce;
pub mod runtime;

pub use coordinator::{CoordinatorCommand, CoordinatorStep, RestartCoordinator, RestartState};
pub use debounce::{ChangeDebouncer, PendingRestart, RestartToken};
pub use runtime::Runtime;
