//! Per-identity poll loops and publication ordering.
//!
//! One task per tracked identity polls the orchestrator on a fixed
//! interval. Every fetch takes a generation number when it is issued, and
//! publication into the per-identity watch channel is conditional on that
//! number, so a slow in-flight fetch can never overwrite the result of a
//! request issued after it. Within one identity the loop is sequential:
//! ticks and manual refreshes queue behind the fetch in progress, and a
//! refresh requested while one is already pending coalesces into it.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use pawtrack_telemetry::TrackerId;
use tokio::sync::{mpsc, watch};

use crate::error::{ApiError, ApiResult};
use crate::merge::{self, ReportPatch};
use crate::orchestrator::ReportService;
use crate::types::{FetchOutcome, SourceStatus};

/// Poll interval bounds; configured intervals clamp into this range.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(300);

pub fn clamp_poll_interval(requested: Duration) -> Duration {
    requested.clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL)
}

/// One generation-stamped outcome made visible to readers.
#[derive(Clone, Debug)]
struct Published {
    generation: u64,
    outcome: Arc<FetchOutcome>,
}

struct TrackerSlot {
    latest: watch::Sender<Option<Published>>,
    refresh: mpsc::Sender<()>,
    cancel: watch::Sender<bool>,
}

struct Shared {
    service: Arc<ReportService>,
    generation: AtomicU64,
}

impl Shared {
    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Registry of poll loops, one per roster identity. The roster is fixed at
/// spawn time; readers for unknown identities are turned away rather than
/// polled for.
pub struct ReportFeed {
    shared: Arc<Shared>,
    slots: HashMap<TrackerId, TrackerSlot>,
}

impl ReportFeed {
    /// Spawn one poll task per roster identity. Each task fetches
    /// immediately, then on every interval tick.
    pub fn spawn(service: Arc<ReportService>, roster: Vec<TrackerId>, interval: Duration) -> Self {
        let interval = clamp_poll_interval(interval);
        let shared = Arc::new(Shared {
            service,
            generation: AtomicU64::new(0),
        });
        let mut slots = HashMap::new();
        for tracker in roster {
            let (latest_tx, _) = watch::channel(None);
            let (refresh_tx, refresh_rx) = mpsc::channel(1);
            let (cancel_tx, cancel_rx) = watch::channel(false);
            tokio::spawn(poll_loop(
                shared.clone(),
                tracker.clone(),
                latest_tx.clone(),
                refresh_rx,
                cancel_rx,
                interval,
            ));
            slots.insert(
                tracker,
                TrackerSlot {
                    latest: latest_tx,
                    refresh: refresh_tx,
                    cancel: cancel_tx,
                },
            );
        }
        Self { shared, slots }
    }

    pub fn contains(&self, tracker: &TrackerId) -> bool {
        self.slots.contains_key(tracker)
    }

    /// Latest publication for a tracker, if any fetch has completed yet.
    pub fn latest(&self, tracker: &TrackerId) -> Option<Arc<FetchOutcome>> {
        self.slots
            .get(tracker)?
            .latest
            .borrow()
            .as_ref()
            .map(|published| published.outcome.clone())
    }

    /// Queue an immediate out-of-band fetch. Returns false for unknown
    /// trackers. A refresh already queued or running absorbs this one.
    pub fn refresh(&self, tracker: &TrackerId) -> bool {
        match self.slots.get(tracker) {
            Some(slot) => {
                let _ = slot.refresh.try_send(());
                true
            }
            None => false,
        }
    }

    /// Wait until a publication exists for this tracker, bounded by
    /// `timeout`.
    pub async fn wait_for_report(
        &self,
        tracker: &TrackerId,
        timeout: Duration,
    ) -> Option<Arc<FetchOutcome>> {
        let slot = self.slots.get(tracker)?;
        let mut rx = slot.latest.subscribe();
        match tokio::time::timeout(timeout, rx.wait_for(|p| p.is_some())).await {
            Ok(Ok(published)) => published.as_ref().map(|p| p.outcome.clone()),
            _ => None,
        }
    }

    /// Merge an override into the latest publication and publish the result
    /// under a fresh generation, so a poll already in flight when the
    /// override arrived cannot clobber it.
    pub fn apply_override(
        &self,
        tracker: &TrackerId,
        patch: &ReportPatch,
    ) -> ApiResult<Arc<FetchOutcome>> {
        let slot = self
            .slots
            .get(tracker)
            .ok_or_else(|| ApiError::UnknownTracker(tracker.to_string()))?;
        let current = slot.latest.borrow().clone();
        let Some(current) = current else {
            return Err(ApiError::NotReady(tracker.to_string()));
        };

        let merged = merge::apply(&current.outcome.report, patch)?;
        let outcome = Arc::new(FetchOutcome {
            report: merged,
            source: SourceStatus {
                reason: "manual override applied".to_string(),
                ..current.outcome.source.clone()
            },
        });
        let generation = self.shared.next_generation();
        tracing::info!(tracker = %tracker, generation, "override published");
        publish_if_newer(
            &slot.latest,
            Published {
                generation,
                outcome: outcome.clone(),
            },
        );
        Ok(outcome)
    }

    /// Signal every poll task to stop after its current fetch.
    pub fn shutdown(&self) {
        for slot in self.slots.values() {
            let _ = slot.cancel.send(true);
        }
    }
}

/// Publication is ordered by issuance generation, not completion order: a
/// candidate older than what readers already see is dropped.
fn publish_if_newer(latest: &watch::Sender<Option<Published>>, candidate: Published) {
    latest.send_if_modified(|current| match current {
        Some(existing) if existing.generation >= candidate.generation => false,
        _ => {
            *current = Some(candidate);
            true
        }
    });
}

async fn poll_loop(
    shared: Arc<Shared>,
    tracker: TrackerId,
    latest: watch::Sender<Option<Published>>,
    mut refresh_rx: mpsc::Receiver<()>,
    mut cancel_rx: watch::Receiver<bool>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            changed = cancel_rx.changed() => {
                if changed.is_err() || *cancel_rx.borrow() {
                    tracing::debug!(tracker = %tracker, "poll loop stopped");
                    return;
                }
            }
            _ = ticker.tick() => {
                fetch_and_publish(&shared, &tracker, &latest).await;
            }
            received = refresh_rx.recv() => {
                if received.is_none() {
                    // Feed dropped; nobody can read publications anymore.
                    return;
                }
                tracing::debug!(tracker = %tracker, "manual refresh");
                fetch_and_publish(&shared, &tracker, &latest).await;
            }
        }
    }
}

/// The generation is taken when the fetch is issued, before any awaiting,
/// which is what makes publication ordering follow request order.
async fn fetch_and_publish(
    shared: &Shared,
    tracker: &TrackerId,
    latest: &watch::Sender<Option<Published>>,
) {
    let generation = shared.next_generation();
    let outcome = shared.service.fetch_daily(tracker).await;
    publish_if_newer(
        latest,
        Published {
            generation,
            outcome: Arc::new(outcome),
        },
    );
}
