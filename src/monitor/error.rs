//! Monitor error types.

use crate::provider::ProviderError;

/// Errors that end a watch abnormally.
#[derive(thiserror::Error, Debug)]
pub enum MonitorError {
    /// The orchestration API failed for a reason other than "not found".
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A spawned child watch panicked or was aborted.
    #[error("Watch task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
