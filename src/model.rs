//! Process and event records shared by the provider and monitor layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subject type reported for a process itself, as opposed to a resource
/// contained within it. An event with this subject type and a physical
/// resource id other than the watched process points at a nested process.
pub const PROCESS_SUBJECT_TYPE: &str = "Platform::Process";

/// Status reason that marks the event starting the current operation.
/// Everything older than this event belongs to a previous operation.
pub const OPERATION_START_REASON: &str = "User Initiated";

/// Statuses that indicate an operation is ongoing, usable as a list filter.
pub const IN_PROGRESS_STATUSES: &[&str] = &[
    "CREATE_IN_PROGRESS",
    "UPDATE_IN_PROGRESS",
    "UPDATE_COMPLETE_CLEANUP_IN_PROGRESS",
    "ROLLBACK_IN_PROGRESS",
    "ROLLBACK_COMPLETE_CLEANUP_IN_PROGRESS",
    "DELETE_IN_PROGRESS",
];

/// Statuses that indicate an ongoing deletion.
pub const DELETING_STATUSES: &[&str] = &["DELETE_IN_PROGRESS"];

/// A resolved process under observation.
///
/// Identity is the source-assigned `physical_id`; `name` and `region` are
/// carried for display and provider routing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRef {
    /// Human-readable process name.
    pub name: String,
    /// Unique physical identifier assigned by the source.
    pub physical_id: String,
    /// Region the process lives in.
    pub region: String,
}

impl PartialEq for ProcessRef {
    fn eq(&self, other: &Self) -> bool {
        self.physical_id == other.physical_id
    }
}

impl Eq for ProcessRef {}

/// A single status transition from a process's event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessEvent {
    /// Opaque, source-assigned event id. Within one poll the log is served
    /// newest-first, so ids decrease as the walk proceeds.
    pub event_id: String,
    /// When the transition happened.
    pub timestamp: DateTime<Utc>,
    /// Name of the subject the transition applies to.
    pub subject_name: String,
    /// Type of the subject (process or contained resource).
    pub subject_type: String,
    /// Status code, e.g. `UPDATE_IN_PROGRESS` or `CREATE_COMPLETE`.
    pub status: String,
    /// Optional free-text reason attached by the source.
    #[serde(default)]
    pub status_reason: Option<String>,
    /// Physical id of the subject, when it has one.
    #[serde(default)]
    pub physical_resource_id: Option<String>,
}

impl ProcessEvent {
    /// Whether this event's subject is the watched process itself.
    #[must_use]
    pub fn is_process_subject(&self, process: &ProcessRef) -> bool {
        self.subject_name == process.name && self.subject_type == PROCESS_SUBJECT_TYPE
    }

    /// Whether this event marks the start of the current operation.
    #[must_use]
    pub fn is_operation_start(&self) -> bool {
        self.status_reason.as_deref() == Some(OPERATION_START_REASON)
    }

    /// Physical id of a nested process this event points at, if any.
    ///
    /// A nested process shows up as a contained resource of the process
    /// subject type whose physical id differs from the watched process.
    #[must_use]
    pub fn nested_process_id(&self, process: &ProcessRef) -> Option<&str> {
        if self.subject_type != PROCESS_SUBJECT_TYPE {
            return None;
        }
        match self.physical_resource_id.as_deref() {
            Some(id) if !id.is_empty() && id != process.physical_id => Some(id),
            _ => None,
        }
    }
}

/// Whether a status code is terminal for a root subject.
///
/// Intermediate phases such as `UPDATE_COMPLETE_CLEANUP_IN_PROGRESS` contain
/// a terminal-looking substring but still end in `_IN_PROGRESS` and are not
/// terminal.
#[must_use]
pub fn is_terminal_status(status: &str) -> bool {
    status.ends_with("_COMPLETE") || status.ends_with("_FAILED")
}

/// Whether a status code describes an ongoing operation.
#[must_use]
pub fn is_in_progress_status(status: &str) -> bool {
    status.ends_with("_IN_PROGRESS")
}
