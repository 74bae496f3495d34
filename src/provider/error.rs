//! Provider error types.

/// Errors from orchestration API calls.
#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    /// The target does not resolve to a known process.
    #[error("Process not found: {target}")]
    NotFound { target: String },

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request could not be sent or the response not received.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body could not be decoded.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The configured endpoint is not a valid URL.
    #[error("Invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}
