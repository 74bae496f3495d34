//! Provider seam for the orchestration API.
//!
//! The monitor core talks to the outside world only through [`ProcessApi`].

mod error;
mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::ProcessEvent;

pub use error::ProviderError;
pub use http::HttpProcessApi;

/// Resolved description of a process, as returned by lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDescription {
    /// Human-readable process name.
    pub name: String,
    /// Unique physical identifier.
    pub physical_id: String,
    /// Region the process lives in.
    pub region: String,
    /// Current process status, e.g. `UPDATE_IN_PROGRESS`.
    pub status: String,
}

/// Summary row from a process listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSummary {
    /// Unique physical identifier.
    pub physical_id: String,
    /// Human-readable process name.
    pub name: String,
}

/// One page of a process's event log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPage {
    /// Events in this page, newest first.
    pub events: Vec<ProcessEvent>,
    /// Cursor for the next page; `None` when the log is exhausted.
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Read access to the orchestration API.
///
/// The event log is append-only and served newest-first; there is no tailing
/// primitive, so every pagination starts from the newest available event.
#[async_trait]
pub trait ProcessApi: Send + Sync {
    /// Resolve a process name or URN to its current description.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotFound`] when the target does not resolve,
    /// or a transport/API error otherwise.
    async fn describe(&self, target: &str) -> Result<ProcessDescription, ProviderError>;

    /// List processes currently in one of the given statuses.
    ///
    /// # Errors
    ///
    /// Returns a transport/API error when the listing fails.
    async fn list(&self, statuses: &[&str]) -> Result<Vec<ProcessSummary>, ProviderError>;

    /// Fetch one page of a process's event log.
    ///
    /// Passing `None` starts a fresh pagination from the newest event;
    /// passing a cursor from a previous page continues it.
    ///
    /// # Errors
    ///
    /// Returns a transport/API error when the read fails.
    async fn poll_events(
        &self,
        physical_id: &str,
        cursor: Option<&str>,
    ) -> Result<EventPage, ProviderError>;
}
