//! Output sinks and line rendering for watched processes.
//!
//! The monitor core hands raw events to the renderers here and pushes the
//! finished lines through a [`Sink`]; nothing below this module knows about
//! colors or formatting.

use std::io::{self, Write};
use std::sync::Mutex;

use owo_colors::OwoColorize;

use crate::model::{ProcessEvent, ProcessRef};

/// An order-preserving, append-only destination for rendered lines.
pub trait Sink: Send + Sync {
    /// Write one line. Must not reorder or drop lines.
    fn emit(&self, line: &str);
}

/// Sink that prints to stdout and flushes per line.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    /// Create a stdout sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Sink for ConsoleSink {
    fn emit(&self, line: &str) {
        println!("{line}");
        let _ = io::stdout().flush();
    }
}

/// Sink that collects lines in memory. Used by tests and embedders that
/// post-process the feed.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Create an empty memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all lines emitted so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("sink lock poisoned").clone()
    }
}

impl Sink for MemorySink {
    fn emit(&self, line: &str) {
        self.lines
            .lock()
            .expect("sink lock poisoned")
            .push(line.to_string());
    }
}

/// Color a status code by its kind.
fn colorize_status(status: &str) -> String {
    if status.ends_with("_FAILED") {
        status.red().bold().to_string()
    } else if status.ends_with("_COMPLETE") {
        status.green().to_string()
    } else {
        status.yellow().to_string()
    }
}

/// Render one event as a feed line.
#[must_use]
pub fn render_event(process: &ProcessRef, event: &ProcessEvent) -> String {
    let label = format!("[{}]", process.name);
    let timestamp = event.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
    let reason = event
        .status_reason
        .as_deref()
        .map(|r| format!(" (Reason: {r})"))
        .unwrap_or_default();

    format!(
        "{} {} {} {} {}{}",
        label.bold(),
        timestamp.dimmed(),
        colorize_status(&event.status),
        event.subject_type,
        event.subject_name,
        reason
    )
}

/// Render an informational outcome line for a watch target.
#[must_use]
pub fn render_notice(label: &str, message: &str) -> String {
    format!("{} {}", format!("[{label}]").bold(), message.dimmed())
}
