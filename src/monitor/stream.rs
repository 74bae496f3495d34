//! Ordered event stream reconstruction.
//!
//! The source serves an append-only event log newest-first and has no tailing
//! primitive, so every polling round re-reads history from the top. The
//! stream turns those rounds into a single live, deduplicated,
//! forward-chronological sequence that ends when the process's own subject
//! reaches a terminal status.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream;

use crate::model::{is_terminal_status, ProcessEvent, ProcessRef};
use crate::provider::{ProcessApi, ProviderError};

/// Default sleep between polling rounds.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

struct StreamState<P: ?Sized> {
    api: Arc<P>,
    process: ProcessRef,
    poll_interval: Duration,
    /// Event ids already emitted. Bounds re-processing across rounds.
    seen: HashSet<String>,
    /// Events collected by the last round, oldest first, not yet yielded.
    ready: VecDeque<ProcessEvent>,
    complete: bool,
    polled_once: bool,
}

impl<P: ProcessApi + ?Sized> StreamState<P> {
    /// Run one polling round: walk the log newest-first, collect unseen
    /// events, and queue them in chronological order.
    async fn poll_round(&mut self) -> Result<(), ProviderError> {
        let mut batch: Vec<ProcessEvent> = Vec::new();
        let mut cursor: Option<String> = None;

        'walk: loop {
            let page = self
                .api
                .poll_events(&self.process.physical_id, cursor.as_deref())
                .await?;

            for event in page.events {
                if self.seen.contains(&event.event_id) {
                    // Every event from here on is older and already emitted.
                    break 'walk;
                }
                self.seen.insert(event.event_id.clone());

                let is_root = event.is_process_subject(&self.process);
                let starts_operation = is_root && event.is_operation_start();
                if is_root && !starts_operation {
                    self.complete = self.complete || is_terminal_status(&event.status);
                }
                batch.push(event);

                if starts_operation {
                    // Everything older belongs to a previous operation.
                    break 'walk;
                }
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        // Collected newest-first; emit oldest-first.
        batch.reverse();
        self.ready.extend(batch);
        Ok(())
    }
}

/// Open a live, ordered, deduplicated event stream for one process.
///
/// The stream is finite: it ends after yielding the round in which the
/// process's own subject reported a terminal (`_COMPLETE`/`_FAILED`) status,
/// and issues no further poll afterward. A provider error ends the stream
/// after being yielded as the final item.
pub fn event_stream<P>(
    api: Arc<P>,
    process: ProcessRef,
    poll_interval: Duration,
) -> impl futures_core::Stream<Item = Result<ProcessEvent, ProviderError>>
where
    P: ProcessApi + ?Sized + 'static,
{
    let state = StreamState {
        api,
        process,
        poll_interval,
        seen: HashSet::new(),
        ready: VecDeque::new(),
        complete: false,
        polled_once: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.ready.pop_front() {
                return Some((Ok(event), state));
            }
            if state.complete {
                return None;
            }
            if state.polled_once {
                tokio::time::sleep(state.poll_interval).await;
            }
            state.polled_once = true;

            if let Err(e) = state.poll_round().await {
                state.complete = true;
                return Some((Err(e), state));
            }
        }
    })
}
