//! Registry of processes under observation.

use std::collections::HashMap;
use std::sync::Mutex;

/// Observation state of one process, keyed by physical id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchStatus {
    /// Known but not currently streamed (e.g. resolved as inert).
    Pending,
    /// A watch is consuming this process's event stream right now.
    Active,
    /// A previous watch ran to completion. May be re-armed.
    Finished,
}

/// Tracks which processes are being watched.
///
/// The only state shared between concurrent watches. `try_activate` is the
/// single check-and-set step that guarantees at most one active watch per
/// physical id; the lock is never held across an await point.
#[derive(Debug, Default)]
pub struct WatchRegistry {
    entries: Mutex<HashMap<String, WatchStatus>>,
}

impl WatchRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt to become the active watcher for a process.
    ///
    /// Returns `true` when this caller won the transition to `Active`.
    /// Returns `false` when another watch is already active for the id; the
    /// caller must back off silently. `Pending` and `Finished` entries are
    /// re-armed.
    pub fn try_activate(&self, physical_id: &str) -> bool {
        let mut entries = self.entries.lock().expect("registry lock poisoned");
        match entries.get(physical_id) {
            Some(WatchStatus::Active) => false,
            _ => {
                entries.insert(physical_id.to_string(), WatchStatus::Active);
                true
            }
        }
    }

    /// Record that the active watch for a process has concluded.
    pub fn finish(&self, physical_id: &str) {
        let mut entries = self.entries.lock().expect("registry lock poisoned");
        entries.insert(physical_id.to_string(), WatchStatus::Finished);
    }

    /// Record a process that was looked at but not activated.
    ///
    /// Never downgrades an `Active` or `Finished` entry.
    pub fn note_pending(&self, physical_id: &str) {
        let mut entries = self.entries.lock().expect("registry lock poisoned");
        entries
            .entry(physical_id.to_string())
            .or_insert(WatchStatus::Pending);
    }

    /// Current status for a process, if it has ever been seen.
    #[must_use]
    pub fn status(&self, physical_id: &str) -> Option<WatchStatus> {
        let entries = self.entries.lock().expect("registry lock poisoned");
        entries.get(physical_id).copied()
    }

    /// Number of watches currently active.
    #[must_use]
    pub fn active_count(&self) -> usize {
        let entries = self.entries.lock().expect("registry lock poisoned");
        entries
            .values()
            .filter(|s| **s == WatchStatus::Active)
            .count()
    }
}
