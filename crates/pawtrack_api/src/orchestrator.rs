//! The one place that decides live vs demo, and why.
//!
//! `fetch_daily` is total: whatever the store does (or whether one is
//! configured at all), the caller gets a complete report plus a
//! `SourceStatus` saying where it came from. Failure classes keep distinct
//! reason strings so an operator can tell a bad URL from a bad store from a
//! silent tracker.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use pawtrack_telemetry::{Series, StoreError, TelemetryStore, TrackerId};

use crate::demo;
use crate::pipeline;
use crate::types::{FetchOutcome, SourceStatus};

/// Days of history backing the trend baselines.
const HISTORY_DAYS: i64 = 7;

#[derive(Clone)]
pub struct ReportService {
    store: Option<Arc<dyn TelemetryStore>>,
    config_reason: String,
    query_limit: u32,
}

impl ReportService {
    pub fn new(store: Arc<dyn TelemetryStore>, query_limit: u32) -> Self {
        Self {
            store: Some(store),
            config_reason: String::new(),
            query_limit,
        }
    }

    /// Service without a store; every fetch serves the demo fallback with
    /// `reason` naming the missing configuration.
    pub fn unconfigured(reason: impl Into<String>, query_limit: u32) -> Self {
        Self {
            store: None,
            config_reason: reason.into(),
            query_limit,
        }
    }

    pub fn store_configured(&self) -> bool {
        self.store.is_some()
    }

    pub async fn fetch_daily(&self, tracker: &TrackerId) -> FetchOutcome {
        let started = Instant::now();
        let outcome = self.fetch_daily_at(tracker, Utc::now()).await;
        metrics::histogram!("report_fetch_seconds").record(started.elapsed().as_secs_f64());
        outcome
    }

    /// Clock-injected variant; tests pin `now` for deterministic reports.
    pub async fn fetch_daily_at(&self, tracker: &TrackerId, now: DateTime<Utc>) -> FetchOutcome {
        let Some(store) = &self.store else {
            return self.demo_outcome(tracker, now, self.config_reason.clone());
        };

        match store.query_recent(tracker, self.query_limit).await {
            Ok(Some(series)) if !series.is_empty() => {
                let history = self.fetch_history(store.as_ref(), tracker, now).await;
                let report = pipeline::derive_report(tracker.as_str(), &series, history.as_ref(), now);
                metrics::counter!("report_fetch_total", "source" => "live").increment(1);
                tracing::debug!(tracker = %tracker, rows = series.row_count(), "derived live report");
                FetchOutcome {
                    report,
                    source: SourceStatus::live("live telemetry"),
                }
            }
            Ok(Some(_)) => self.demo_outcome(
                tracker,
                now,
                format!("no data for tracker {tracker}: the series has no rows in the window"),
            ),
            Ok(None) => self.demo_outcome(
                tracker,
                now,
                format!("no data for tracker {tracker}: the query produced no series"),
            ),
            Err(err) => self.demo_outcome(tracker, now, reason_for(&err)),
        }
    }

    /// Previous seven full UTC days, for the trend baselines. Best-effort: a
    /// failure here degrades the trend block to defaults, it never pushes a
    /// live report into demo.
    async fn fetch_history(
        &self,
        store: &dyn TelemetryStore,
        tracker: &TrackerId,
        now: DateTime<Utc>,
    ) -> Option<Series> {
        let end = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let start = end - Duration::days(HISTORY_DAYS);
        match store.query_window(tracker, start, end).await {
            Ok(series) => series,
            Err(err) => {
                tracing::warn!(
                    tracker = %tracker,
                    error = %err,
                    "history query failed; trend falls back to defaults"
                );
                None
            }
        }
    }

    fn demo_outcome(
        &self,
        tracker: &TrackerId,
        now: DateTime<Utc>,
        reason: impl Into<String>,
    ) -> FetchOutcome {
        let reason = reason.into();
        metrics::counter!("report_fetch_total", "source" => "demo").increment(1);
        tracing::warn!(tracker = %tracker, %reason, "serving demo fallback");
        FetchOutcome {
            report: demo::demo_report(tracker, now),
            source: SourceStatus::demo(reason),
        }
    }
}

/// Human-readable reason per failure class. Routing mistakes (an HTML page
/// where JSON should be) read differently from store errors and from data
/// errors.
fn reason_for(err: &StoreError) -> String {
    match err {
        StoreError::Http(e) if e.is_timeout() => "store query timed out".to_string(),
        StoreError::Http(e) => format!("store unreachable: {e}"),
        StoreError::Status { status, .. } => format!("store returned status {status}"),
        StoreError::ContentType(msg) => format!("routing error: {msg}"),
        StoreError::Schema(msg) => format!("data error: {msg}"),
        StoreError::Config(msg) => format!("store not configured: {msg}"),
    }
}
