//! JSON-over-HTTP implementation of [`ProcessApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use super::{EventPage, ProcessApi, ProcessDescription, ProcessSummary, ProviderError};

/// Connection timeout for HTTP requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall request timeout for HTTP requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum number of retries for transient failures.
const MAX_RETRIES: u32 = 9;

/// Build an HTTP client with proper timeout configuration.
fn build_http_client() -> Client {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("Failed to build HTTP client")
}

/// Determine if a request should be retried based on status code and attempt count.
fn should_retry(status_code: u16, attempt: u32) -> bool {
    if attempt >= MAX_RETRIES {
        return false;
    }
    // Retry on 5xx server errors
    (500..600).contains(&status_code)
}

/// Calculate exponential backoff duration for retry attempts, capped at 8s.
fn retry_backoff(attempt: u32) -> Duration {
    Duration::from_millis(250 * u64::from(1u32 << attempt.min(5)))
}

/// Error body shape the API uses for non-success responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Extract a human-readable message from an error response body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) if body.trim().is_empty() => "no error body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct DescribeResponse {
    process: ProcessDescription,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    processes: Vec<ProcessSummary>,
}

/// [`ProcessApi`] client for the orchestration service's JSON API.
#[derive(Debug, Clone)]
pub struct HttpProcessApi {
    client: Client,
    base: Url,
    region: Option<String>,
}

impl HttpProcessApi {
    /// Create a client against the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Endpoint`] when the endpoint is not a valid
    /// URL.
    pub fn new(endpoint: &str, region: Option<String>) -> Result<Self, ProviderError> {
        let base = Url::parse(endpoint)?;
        Ok(Self {
            client: build_http_client(),
            base,
            region,
        })
    }

    /// The endpoint this client talks to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.base
    }

    /// Issue a GET, retrying transient server errors, and decode the body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let url = self.base.join(path)?;
        let mut attempt = 0;
        loop {
            let mut request = self.client.get(url.clone()).query(query);
            if let Some(region) = &self.region {
                request = request.query(&[("region", region.as_str())]);
            }
            let response = request.send().await?;
            let status = response.status().as_u16();

            if response.status().is_success() {
                let body = response.text().await?;
                return serde_json::from_str(&body)
                    .map_err(|e| ProviderError::Decode(e.to_string()));
            }

            let body = response.text().await.unwrap_or_default();
            if should_retry(status, attempt) {
                attempt += 1;
                let backoff = retry_backoff(attempt);
                tracing::debug!(
                    path,
                    status,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    "Retrying transient API failure"
                );
                tokio::time::sleep(backoff).await;
                continue;
            }

            return Err(ProviderError::Api {
                status,
                message: error_message(&body),
            });
        }
    }
}

#[async_trait]
impl ProcessApi for HttpProcessApi {
    async fn describe(&self, target: &str) -> Result<ProcessDescription, ProviderError> {
        let response: Result<DescribeResponse, ProviderError> = self
            .get_json("v1/processes/describe", &[("target", target)])
            .await;
        match response {
            Ok(body) => Ok(body.process),
            Err(ProviderError::Api { status: 404, .. }) => Err(ProviderError::NotFound {
                target: target.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    async fn list(&self, statuses: &[&str]) -> Result<Vec<ProcessSummary>, ProviderError> {
        let filter = statuses.join(",");
        let body: ListResponse = self
            .get_json("v1/processes", &[("status", filter.as_str())])
            .await?;
        Ok(body.processes)
    }

    async fn poll_events(
        &self,
        physical_id: &str,
        cursor: Option<&str>,
    ) -> Result<EventPage, ProviderError> {
        let mut query = vec![("process", physical_id)];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor));
        }
        self.get_json("v1/events", &query).await
    }
}
