//! Shared fixtures: a scripted orchestration API and event builders.
//!
//! The API mock mimics the real backend's shape: an append-only history
//! served newest-first in pages of two, growing by one scripted round each
//! time a fresh pagination starts.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use opwatch::model::{ProcessEvent, OPERATION_START_REASON, PROCESS_SUBJECT_TYPE};
use opwatch::provider::{
    EventPage, ProcessApi, ProcessDescription, ProcessSummary, ProviderError,
};

/// Events served per page.
const PAGE_SIZE: usize = 2;

pub fn description(name: &str, physical_id: &str, status: &str) -> ProcessDescription {
    ProcessDescription {
        name: name.to_string(),
        physical_id: physical_id.to_string(),
        region: "eu-north-1".to_string(),
        status: status.to_string(),
    }
}

pub fn summary(name: &str, physical_id: &str) -> ProcessSummary {
    ProcessSummary {
        physical_id: physical_id.to_string(),
        name: name.to_string(),
    }
}

fn event(id: &str, subject_type: &str, subject_name: &str, status: &str) -> ProcessEvent {
    ProcessEvent {
        event_id: id.to_string(),
        timestamp: Utc::now(),
        subject_name: subject_name.to_string(),
        subject_type: subject_type.to_string(),
        status: status.to_string(),
        status_reason: None,
        physical_resource_id: None,
    }
}

/// Event whose subject is the process itself.
pub fn process_event(id: &str, name: &str, physical_id: &str, status: &str) -> ProcessEvent {
    let mut e = event(id, PROCESS_SUBJECT_TYPE, name, status);
    e.physical_resource_id = Some(physical_id.to_string());
    e
}

/// The root-subject event that starts an operation.
pub fn start_marker(id: &str, name: &str, physical_id: &str, status: &str) -> ProcessEvent {
    let mut e = process_event(id, name, physical_id, status);
    e.status_reason = Some(OPERATION_START_REASON.to_string());
    e
}

/// Event for a plain contained resource.
pub fn resource_event(id: &str, name: &str, status: &str) -> ProcessEvent {
    event(id, "Platform::Queue", name, status)
}

/// Event pointing at a nested process with its own physical id.
pub fn nested_event(id: &str, child_name: &str, child_id: &str, status: &str) -> ProcessEvent {
    let mut e = event(id, PROCESS_SUBJECT_TYPE, child_name, status);
    e.physical_resource_id = Some(child_id.to_string());
    e
}

struct ProcessScript {
    /// Successive describe answers; the last one keeps being served.
    descriptions: VecDeque<ProcessDescription>,
    /// Events appended to history per fresh pagination.
    rounds: VecDeque<Vec<ProcessEvent>>,
    history: Vec<ProcessEvent>,
    cursor: usize,
}

/// Scripted [`ProcessApi`] keyed by physical id.
#[derive(Default)]
pub struct ScriptedApi {
    processes: Mutex<HashMap<String, ProcessScript>>,
    listing: Mutex<Vec<ProcessSummary>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a process with its describe answers and event rounds.
    pub fn insert_process(
        &self,
        physical_id: &str,
        descriptions: Vec<ProcessDescription>,
        rounds: Vec<Vec<ProcessEvent>>,
    ) {
        let script = ProcessScript {
            descriptions: descriptions.into(),
            rounds: rounds.into(),
            history: Vec::new(),
            cursor: 0,
        };
        self.processes
            .lock()
            .unwrap()
            .insert(physical_id.to_string(), script);
    }

    pub fn set_listing(&self, summaries: Vec<ProcessSummary>) {
        *self.listing.lock().unwrap() = summaries;
    }
}

#[async_trait]
impl ProcessApi for ScriptedApi {
    async fn describe(&self, target: &str) -> Result<ProcessDescription, ProviderError> {
        let mut processes = self.processes.lock().unwrap();
        let Some(script) = processes.get_mut(target) else {
            return Err(ProviderError::NotFound {
                target: target.to_string(),
            });
        };
        let description = if script.descriptions.len() > 1 {
            script.descriptions.pop_front()
        } else {
            script.descriptions.front().cloned()
        };
        description.ok_or_else(|| ProviderError::NotFound {
            target: target.to_string(),
        })
    }

    async fn list(&self, _statuses: &[&str]) -> Result<Vec<ProcessSummary>, ProviderError> {
        Ok(self.listing.lock().unwrap().clone())
    }

    async fn poll_events(
        &self,
        physical_id: &str,
        cursor: Option<&str>,
    ) -> Result<EventPage, ProviderError> {
        let mut processes = self.processes.lock().unwrap();
        let Some(script) = processes.get_mut(physical_id) else {
            return Err(ProviderError::Api {
                status: 404,
                message: format!("unknown process {physical_id}"),
            });
        };

        if cursor.is_none() {
            // Fresh pagination: grow history by one round and restart from
            // the newest event.
            if let Some(added) = script.rounds.pop_front() {
                script.history.extend(added);
                script.history.sort_by(|a, b| b.event_id.cmp(&a.event_id));
            }
            script.cursor = 0;
        }

        let start = script.cursor;
        let end = (start + PAGE_SIZE).min(script.history.len());
        let events = script.history[start..end].to_vec();
        script.cursor = end;

        let next_cursor = if end < script.history.len() {
            Some(format!("next={end}"))
        } else {
            None
        };
        Ok(EventPage { events, next_cursor })
    }
}
