// src/engine/debounce.rs

//! Trailing-edge debouncing of filesystem changes.
//!
//! The debouncer is a plain state machine: callers pass in the current time,
//! and the runtime sleeps until [`PendingRestart::deadline`]. No timers live
//! in here, so behaviour is testable with synthetic instants.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace};

use crate::watch::{WatchEvent, WatchFilter};

/// Identity of one armed timer. A token that has been superseded never fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RestartToken(u64);

/// "A restart will fire at `deadline` unless re-armed."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRestart {
    pub token: RestartToken,
    pub deadline: Instant,
}

/// Collapses bursts of admitted [`WatchEvent`]s into a single restart that
/// fires `delay` after the last one.
#[derive(Debug)]
pub struct ChangeDebouncer {
    filter: WatchFilter,
    delay: Duration,
    pending: Option<PendingRestart>,
    next_token: u64,
}

impl ChangeDebouncer {
    pub fn new(filter: WatchFilter, delay: Duration) -> Self {
        Self {
            filter,
            delay,
            pending: None,
            next_token: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn filter(&self) -> &WatchFilter {
        &self.filter
    }

    /// Currently armed timer, if any.
    pub fn pending(&self) -> Option<PendingRestart> {
        self.pending
    }

    /// Offer a filesystem event observed at `now`.
    ///
    /// Events rejected by the filter are dropped without touching the
    /// pending timer. Admitted events (re)arm it and return the new pending
    /// restart.
    pub fn offer(&mut self, event: &WatchEvent, now: Instant) -> Option<PendingRestart> {
        if !self.filter.admits(&event.path) {
            trace!(path = %event.path, kind = %event.kind, "ignored change");
            return None;
        }

        debug!(path = %event.path, kind = %event.kind, "change admitted; arming restart");
        Some(self.arm(now))
    }

    /// Cancel any pending timer and arm a fresh one for `now + delay`.
    pub fn arm(&mut self, now: Instant) -> PendingRestart {
        if let Some(previous) = self.pending.take() {
            trace!(token = ?previous.token, "superseding pending restart");
        }

        self.next_token += 1;
        let pending = PendingRestart {
            token: RestartToken(self.next_token),
            deadline: now + self.delay,
        };
        self.pending = Some(pending);
        pending
    }

    /// Consume the pending timer if `token` is still the current one.
    ///
    /// Returns false for superseded or already-fired tokens.
    pub fn fire(&mut self, token: RestartToken) -> bool {
        match self.pending {
            Some(p) if p.token == token => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Fire the pending timer if its deadline has been reached at `now`.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(p) if now >= p.deadline => self.fire(p.token),
            _ => false,
        }
    }

    /// Drop the pending timer without firing it.
    pub fn cancel(&mut self) -> Option<PendingRestart> {
        self.pending.take()
    }
}
