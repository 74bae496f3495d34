//! Watch orchestration: resolve a target, attach, follow its event stream,
//! and fan out to nested processes discovered along the way.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::{FutureExt, StreamExt};
use tokio::task::JoinHandle;

use crate::model::{is_in_progress_status, ProcessRef, DELETING_STATUSES, IN_PROGRESS_STATUSES};
use crate::output::{self, Sink};
use crate::provider::{ProcessApi, ProviderError};

use super::error::MonitorError;
use super::registry::WatchRegistry;
use super::stream::{event_stream, DEFAULT_POLL_INTERVAL};

/// Await a set of spawned watches, surfacing the first failure after every
/// handle has settled.
async fn join_watches(
    handles: Vec<JoinHandle<Result<(), MonitorError>>>,
) -> Result<(), MonitorError> {
    let mut first_error: Option<MonitorError> = None;
    for handle in handles {
        let outcome = match handle.await {
            Ok(result) => result,
            Err(join_error) => Err(MonitorError::Join(join_error)),
        };
        if let Err(e) = outcome {
            if first_error.is_none() {
                first_error = Some(e);
            } else {
                tracing::warn!(error = %e, "Additional watch failure");
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Drives watches over a [`ProcessApi`], one task per process.
///
/// A `Monitor` is a cheap handle: clones share the registry that keeps
/// concurrent watches from attaching to the same process twice, which is how
/// a watch can spawn further watches for the nested processes it discovers.
pub struct Monitor<P: ?Sized> {
    api: Arc<P>,
    sink: Arc<dyn Sink>,
    registry: Arc<WatchRegistry>,
    poll_interval: Duration,
}

impl<P: ?Sized> Clone for Monitor<P> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            sink: Arc::clone(&self.sink),
            registry: Arc::clone(&self.registry),
            poll_interval: self.poll_interval,
        }
    }
}

impl<P: ProcessApi + ?Sized + 'static> Monitor<P> {
    /// Create a monitor with the default polling interval.
    #[must_use]
    pub fn new(api: Arc<P>, sink: Arc<dyn Sink>) -> Self {
        Self::with_poll_interval(api, sink, DEFAULT_POLL_INTERVAL)
    }

    /// Create a monitor with a custom polling interval.
    #[must_use]
    pub fn with_poll_interval(api: Arc<P>, sink: Arc<dyn Sink>, poll_interval: Duration) -> Self {
        Self {
            api,
            sink,
            registry: Arc::new(WatchRegistry::new()),
            poll_interval,
        }
    }

    /// The registry tracking watch states.
    #[must_use]
    pub fn registry(&self) -> &WatchRegistry {
        &self.registry
    }

    /// Watch one process until its current operation concludes.
    ///
    /// Resolves `target` (name or URN), skips processes with no ongoing
    /// operation, and otherwise follows the ordered event stream, spawning a
    /// child watch for every nested process discovered. The returned future
    /// resolves only after the stream has ended and every descendant watch
    /// has finished.
    ///
    /// An unresolvable target and an inert process are reported through the
    /// sink and are not errors; a target already being watched is skipped
    /// silently.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError`] when the provider fails for any reason other
    /// than "not found", or when a descendant watch fails.
    pub fn watch(&self, target: impl Into<String>) -> BoxFuture<'static, Result<(), MonitorError>> {
        let this = self.clone();
        let target = target.into();
        async move {
            let description = match this.api.describe(&target).await {
                Ok(description) => description,
                Err(ProviderError::NotFound { .. }) => {
                    this.sink
                        .emit(&output::render_notice(&target, "Process does not exist"));
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };

            let process = ProcessRef {
                name: description.name,
                physical_id: description.physical_id,
                region: description.region,
            };

            if !is_in_progress_status(&description.status) {
                this.registry.note_pending(&process.physical_id);
                this.sink
                    .emit(&output::render_notice(&process.name, "No operations ongoing"));
                return Ok(());
            }

            if !this.registry.try_activate(&process.physical_id) {
                tracing::debug!(
                    process = %process.name,
                    id = %process.physical_id,
                    "Already being watched, skipping"
                );
                return Ok(());
            }

            tracing::debug!(
                process = %process.name,
                id = %process.physical_id,
                status = %description.status,
                "Attached to process"
            );

            let events = event_stream(Arc::clone(&this.api), process.clone(), this.poll_interval);
            tokio::pin!(events);

            let mut children: Vec<JoinHandle<Result<(), MonitorError>>> = Vec::new();
            let mut outcome = Ok(());

            while let Some(item) = events.next().await {
                match item {
                    Ok(event) => {
                        this.sink.emit(&output::render_event(&process, &event));
                        if let Some(child_id) = event.nested_process_id(&process) {
                            tracing::debug!(
                                parent = %process.name,
                                child = %child_id,
                                "Discovered nested process"
                            );
                            children.push(tokio::spawn(this.watch(child_id)));
                        }
                    }
                    Err(e) => {
                        outcome = Err(MonitorError::Provider(e));
                        break;
                    }
                }
            }

            this.registry.finish(&process.physical_id);
            tracing::debug!(process = %process.name, "Watch finished");

            let children_outcome = join_watches(children).await;
            outcome.and(children_outcome)
        }
        .boxed()
    }

    /// Watch several targets concurrently, resolving when all of them (and
    /// their descendants) have finished.
    ///
    /// # Errors
    ///
    /// Returns the first watch failure after every watch has settled.
    pub async fn watch_many(
        &self,
        targets: impl IntoIterator<Item = String>,
    ) -> Result<(), MonitorError> {
        let handles = targets
            .into_iter()
            .map(|target| tokio::spawn(self.watch(target)))
            .collect();
        join_watches(handles).await
    }

    /// Discover and watch every process with an ongoing operation.
    ///
    /// # Errors
    ///
    /// Returns a provider error when the listing fails, or the first watch
    /// failure otherwise.
    pub async fn watch_in_progress(&self) -> Result<(), MonitorError> {
        self.watch_listed(IN_PROGRESS_STATUSES).await
    }

    /// Discover and watch every process currently being deleted.
    ///
    /// # Errors
    ///
    /// Returns a provider error when the listing fails, or the first watch
    /// failure otherwise.
    pub async fn watch_deleting(&self) -> Result<(), MonitorError> {
        self.watch_listed(DELETING_STATUSES).await
    }

    async fn watch_listed(&self, statuses: &[&str]) -> Result<(), MonitorError> {
        let summaries = self.api.list(statuses).await?;
        tracing::info!(count = summaries.len(), "Discovered processes to watch");
        self.watch_many(summaries.into_iter().map(|s| s.physical_id))
            .await
    }
}
