// src/watch/event.rs

//! Conversion from raw `notify` events into [`WatchEvent`]s.

use std::path::Path;

use notify::event::{EventKind, ModifyKind};
use tokio::time::Instant;
use tracing::warn;

use crate::types::ChangeKind;
use crate::watch::path_utils::relative_str;

/// A single filesystem change, relative to the watch root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    /// Path relative to the watch root, with forward slashes.
    pub path: String,
    pub kind: ChangeKind,
    pub timestamp: Instant,
}

impl WatchEvent {
    pub fn new(path: impl Into<String>, kind: ChangeKind, timestamp: Instant) -> Self {
        Self {
            path: path.into(),
            kind,
            timestamp,
        }
    }
}

/// Map a notify event kind to a [`ChangeKind`].
///
/// Returns `None` for pure access events (open/read/close without write),
/// which never indicate a content change.
pub fn change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Access(_) => None,
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Renamed),
        EventKind::Modify(_) => Some(ChangeKind::Modified),
        EventKind::Remove(_) => Some(ChangeKind::Removed),
        EventKind::Any | EventKind::Other => Some(ChangeKind::Other),
    }
}

/// Split one notify event into one [`WatchEvent`] per affected path.
///
/// Paths that cannot be related to `root` are logged and dropped.
pub fn watch_events_from_notify(
    root: &Path,
    event: &notify::Event,
    now: Instant,
) -> Vec<WatchEvent> {
    let Some(kind) = change_kind(&event.kind) else {
        return Vec::new();
    };

    event
        .paths
        .iter()
        .filter_map(|path| match relative_str(root, path) {
            Some(rel) => Some(WatchEvent::new(rel, kind, now)),
            None => {
                warn!(
                    "could not relativize path {:?} against root {:?}",
                    path, root
                );
                None
            }
        })
        .collect()
}
