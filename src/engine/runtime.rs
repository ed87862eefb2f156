// src/engine/runtime.rs

use std::collections::VecDeque;
use std::fmt;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, trace};

use crate::console;
use crate::control::OperatorCommand;
use crate::display::TreeDisplay;
use crate::errors::Result;
use crate::exec::{ExitOutcome, LaunchSpec, ProcessSpawner, ProcessSupervisor, StopFuture};

use super::coordinator::{CoordinatorCommand, CoordinatorStep, RestartCoordinator};
use super::debounce::ChangeDebouncer;
use super::{RestartReason, RuntimeEvent, ShutdownReason};

/// What woke the event loop up.
enum Wake {
    StopResolved,
    Event(RuntimeEvent),
    EventsClosed,
    DebounceDue,
}

/// Drives the restart coordinator in response to `RuntimeEvent`s and
/// delegates actual process handling to a `ProcessSupervisor`.
///
/// This is the IO shell around the pure [`RestartCoordinator`] and
/// [`ChangeDebouncer`]: it owns every piece of mutable supervisor state,
/// waits on the event channel, the debounce deadline and the in-flight
/// stop, and executes the coordinator's commands.
pub struct Runtime<S: ProcessSpawner> {
    core: RestartCoordinator,
    supervisor: ProcessSupervisor<S>,
    debouncer: ChangeDebouncer,
    display: TreeDisplay,
    launch: LaunchSpec,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    stop_in_flight: Option<StopFuture>,
    events_closed: bool,
}

impl<S: ProcessSpawner> fmt::Debug for Runtime<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("supervisor", &self.supervisor)
            .field("pending", &self.debouncer.pending())
            .field("stop_in_flight", &self.stop_in_flight.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: ProcessSpawner> Runtime<S> {
    pub fn new(
        supervisor: ProcessSupervisor<S>,
        debouncer: ChangeDebouncer,
        display: TreeDisplay,
        launch: LaunchSpec,
        event_rx: mpsc::Receiver<RuntimeEvent>,
    ) -> Self {
        Self {
            core: RestartCoordinator::new(),
            supervisor,
            debouncer,
            display,
            launch,
            event_rx,
            stop_in_flight: None,
            events_closed: false,
        }
    }

    /// Start the child and supervise it until shutdown.
    ///
    /// If the loop fails, the current child is still stopped (and awaited)
    /// before the error is returned.
    pub async fn run(mut self) -> Result<()> {
        info!(cmd = %self.launch, "syncserver runtime started");

        let result = self.event_loop().await;

        match &result {
            Ok(()) => console::shutdown_complete(),
            Err(err) => {
                error!(error = %err, "runtime failed; stopping child before exit");
                self.supervisor.stop().await;
            }
        }

        info!("runtime exiting");
        result
    }

    async fn event_loop(&mut self) -> Result<()> {
        let boot = self.core.boot();
        if !self.apply(boot)? {
            return Ok(());
        }

        loop {
            let deadline = self.debouncer.pending().map(|p| p.deadline);
            let events_open = !self.events_closed;

            let wake = tokio::select! {
                biased;

                _ = wait_for_stop(&mut self.stop_in_flight) => Wake::StopResolved,

                event = self.event_rx.recv(), if events_open => match event {
                    Some(event) => Wake::Event(event),
                    None => Wake::EventsClosed,
                },

                _ = sleep_until_deadline(deadline) => Wake::DebounceDue,
            };

            let keep_running = match wake {
                Wake::StopResolved => {
                    debug!("in-flight stop resolved");
                    let step = self.core.stop_resolved();
                    self.apply(step)?
                }
                Wake::Event(event) => {
                    trace!(?event, "runtime received event");
                    self.handle_event(event)?
                }
                Wake::EventsClosed => {
                    // Only when the supervisor reports exits on another channel.
                    info!("runtime event channel closed; shutting down");
                    self.events_closed = true;
                    self.shutdown(ShutdownReason::ChannelClosed)?
                }
                Wake::DebounceDue => self.debounce_due()?,
            };

            if !keep_running {
                info!("coordinator requested exit; stopping runtime");
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: RuntimeEvent) -> Result<bool> {
        match event {
            RuntimeEvent::FileChanged(change) => {
                if self.core.is_shutting_down() {
                    trace!(path = %change.path, "change during shutdown; ignoring");
                    return Ok(true);
                }
                if self.debouncer.offer(&change, Instant::now()).is_some() {
                    self.display.report_change(&change);
                }
                Ok(true)
            }
            RuntimeEvent::Operator(command) => self.handle_command(command),
            RuntimeEvent::ProcessExited {
                generation,
                outcome,
            } => {
                self.process_exited(generation, &outcome);
                Ok(true)
            }
            RuntimeEvent::ShutdownRequested { reason } => self.shutdown(reason),
        }
    }

    fn handle_command(&mut self, command: OperatorCommand) -> Result<bool> {
        debug!(?command, "operator command");
        match command {
            OperatorCommand::Restart => {
                // A manual restart already covers any pending change.
                self.debouncer.cancel();
                self.restart(RestartReason::Operator)
            }
            OperatorCommand::Shutdown => self.shutdown(ShutdownReason::Operator),
            OperatorCommand::Info => {
                console::info(
                    &self.launch,
                    self.display.root(),
                    self.debouncer.delay(),
                    self.debouncer.filter().extensions(),
                );
                Ok(true)
            }
            OperatorCommand::ToggleFormat => {
                let mode = self.display.toggle_format();
                console::display_mode(mode);
                Ok(true)
            }
            OperatorCommand::ToggleTree => {
                let scope = self.display.toggle_tree();
                console::watch_scope(scope);
                if scope.shows_tree() {
                    self.display.show_tree();
                }
                Ok(true)
            }
            OperatorCommand::Help => {
                console::help();
                Ok(true)
            }
        }
    }

    fn debounce_due(&mut self) -> Result<bool> {
        if !self.debouncer.fire_due(Instant::now()) {
            trace!("debounce wake-up without a due restart");
            return Ok(true);
        }
        self.restart(RestartReason::FileChange)
    }

    fn restart(&mut self, reason: RestartReason) -> Result<bool> {
        let step = self.core.request_restart(reason);
        if !step.commands.is_empty() {
            console::restarting(reason);
        }
        self.apply(step)
    }

    fn shutdown(&mut self, reason: ShutdownReason) -> Result<bool> {
        self.debouncer.cancel();
        if !self.core.is_shutting_down() {
            console::shutting_down(reason);
        }
        let step = self.core.request_shutdown(reason);
        self.apply(step)
    }

    fn process_exited(&mut self, generation: u64, outcome: &ExitOutcome) {
        let current = self.supervisor.current().map(|p| p.generation());
        if current != Some(generation) {
            debug!(generation, ?current, %outcome, "exit of a replaced child confirmed");
            return;
        }

        match outcome {
            ExitOutcome::LaunchFailed(err) => console::launch_failed(&self.launch, err),
            _ if self.core.exit_expected() => {
                debug!(generation, %outcome, "child exited after stop request");
            }
            _ => {
                info!(generation, %outcome, "child exited on its own; waiting for changes");
                console::child_exited(outcome);
            }
        }
    }

    /// Execute the coordinator's commands, feeding follow-up steps back in.
    ///
    /// Returns whether the loop should keep running.
    fn apply(&mut self, step: CoordinatorStep) -> Result<bool> {
        let mut keep_running = step.keep_running;
        let mut queue: VecDeque<CoordinatorCommand> = step.commands.into();

        while let Some(command) = queue.pop_front() {
            match command {
                CoordinatorCommand::StopProcess => {
                    if self.stop_in_flight.is_some() {
                        debug!("stop already in flight; not issuing another");
                        continue;
                    }
                    self.stop_in_flight = Some(self.supervisor.stop());
                }
                CoordinatorCommand::StartProcess => {
                    let process = self.supervisor.start(self.launch.clone())?;
                    if !process.is_closed() {
                        console::child_started(process.generation(), process.spec());
                    }
                    let next = self.core.start_issued();
                    keep_running &= next.keep_running;
                    queue.extend(next.commands);
                }
                CoordinatorCommand::Exit => {
                    keep_running = false;
                }
            }
        }

        Ok(keep_running)
    }
}

/// Resolves when the in-flight stop does, then clears it. Pending forever
/// when nothing is in flight.
async fn wait_for_stop(stop: &mut Option<StopFuture>) {
    match stop {
        Some(fut) => {
            fut.as_mut().await;
            *stop = None;
        }
        None => std::future::pending().await,
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
