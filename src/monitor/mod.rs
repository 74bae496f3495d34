//! Watch orchestration over process event logs.
//!
//! Reconstructs one ordered live feed per process and fans out to nested
//! processes discovered while streaming.

mod error;
mod orchestrator;
mod registry;
mod stream;

pub use error::MonitorError;
pub use orchestrator::Monitor;
pub use registry::{WatchRegistry, WatchStatus};
pub use stream::{event_stream, DEFAULT_POLL_INTERVAL};
