use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use libmysound_catalog::{CatalogClient, TrackRecord};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::descriptor::build_queue_item;
use crate::dto::command::Command;
use crate::dto::queue_item::QueueItem;
use crate::dto::session_response::SessionResponse;
use crate::two_way_channel::WeakTwoWaySender;

/// Identifies which binding and which queue a prefetch was issued for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PrefetchTag {
    pub(crate) generation: u64,
    pub(crate) queue_generation: u64,
    /// Playback ended and should continue with whatever gets appended.
    pub(crate) terminal: bool,
}

#[derive(Debug, Default)]
pub(crate) struct PrefetchTracker {
    in_flight: HashSet<String>,
    completed: HashSet<String>,
    // Playback ended while this trigger's request was still running
    continue_on: Option<String>,
    requests: u64,
}

impl PrefetchTracker {
    /// Registers a request for `trigger_id`. Returns false if one is already running, or already
    /// done for the current queue.
    ///
    /// A `terminal` request may repeat a completed trigger. If one is still running, that request
    /// is marked to continue playback instead and no new request is issued.
    pub(crate) fn begin(&mut self, trigger_id: &str, terminal: bool) -> bool {
        if self.in_flight.contains(trigger_id) {
            if terminal {
                self.continue_on = Some(trigger_id.to_owned());
            }
            return false;
        }
        if !terminal && self.completed.contains(trigger_id) {
            return false;
        }
        self.in_flight.insert(trigger_id.to_owned());
        self.requests += 1;
        true
    }

    /// Returns true if playback ended while the request was running.
    pub(crate) fn finish(&mut self, trigger_id: &str) -> bool {
        self.in_flight.remove(trigger_id);
        self.completed.insert(trigger_id.to_owned());
        self.continue_on
            .take_if(|id| id.as_str() == trigger_id)
            .is_some()
    }

    /// Requests that were cancelled with their binding will never complete.
    pub(crate) fn cancel_in_flight(&mut self) {
        self.in_flight.clear();
        self.continue_on = None;
    }

    /// Forgets everything tied to the current queue.
    pub(crate) fn reset(&mut self) {
        self.in_flight.clear();
        self.completed.clear();
        self.continue_on = None;
    }

    pub(crate) fn requests(&self) -> u64 {
        self.requests
    }
}

pub(crate) fn spawn_prefetch(
    catalog: Arc<dyn CatalogClient>,
    trigger_id: String,
    request_timeout: Duration,
    tag: PrefetchTag,
    cancel: CancellationToken,
    mailbox: WeakTwoWaySender<Command, SessionResponse>,
) {
    tokio::spawn(async move {
        let recommendations = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Prefetch for {trigger_id} cancelled");
                return;
            }
            recommendations = fetch_recommendations(catalog.as_ref(), &trigger_id, request_timeout) => {
                recommendations
            }
        };

        mailbox
            .send_async(Command::PrefetchCompleted {
                tag,
                trigger_id,
                recommendations,
            })
            .await;
    });
}

pub(crate) async fn fetch_recommendations(
    catalog: &dyn CatalogClient,
    trigger_id: &str,
    request_timeout: Duration,
) -> Vec<TrackRecord> {
    match timeout(request_timeout, catalog.get_recommendations(trigger_id)).await {
        Ok(recommendations) => recommendations,
        Err(_) => {
            warn!("Timed out fetching recommendations for {trigger_id}");
            vec![]
        }
    }
}

/// Picks the recommendations that can be appended: nothing already in the live timeline, nothing
/// repeated within the batch and nothing that can't be streamed.
pub(crate) fn plan_append(
    live_ids: &[String],
    recommendations: &[TrackRecord],
    base_url: &str,
) -> Vec<QueueItem> {
    let mut seen: HashSet<&str> = live_ids.iter().map(|id| id.as_str()).collect();
    let mut items = vec![];
    for record in recommendations {
        if !seen.insert(record.id.as_str()) {
            continue;
        }
        match build_queue_item(record, base_url) {
            Ok(item) => items.push(item),
            Err(e) => warn!("Skipping recommendation: {e}"),
        }
    }
    info!(
        "Planned {} of {} recommendations for append",
        items.len(),
        recommendations.len()
    );
    items
}

#[cfg(test)]
#[path = "./prefetch_test.rs"]
mod prefetch_test;
