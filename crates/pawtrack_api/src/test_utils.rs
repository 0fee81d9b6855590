#![cfg(test)]
//! Shared test doubles for the service crate.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pawtrack_telemetry::{Series, StoreError, TelemetryStore, TrackerId};

pub fn series_from_json(v: serde_json::Value) -> Series {
    serde_json::from_value(v).expect("test series json")
}

/// Scripted store: `query_recent` pops the next queued response and answers
/// `Ok(None)` once the script runs dry; `query_window` replays one canned
/// history response and records the bounds it was asked for.
pub struct ScriptedStore {
    recent: Mutex<VecDeque<Result<Option<Series>, StoreError>>>,
    window: Mutex<Result<Option<Series>, StoreError>>,
    last_window: Mutex<Option<(DateTime<Utc>, DateTime<Utc>)>>,
    recent_calls: AtomicUsize,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self {
            recent: Mutex::new(VecDeque::new()),
            window: Mutex::new(Ok(None)),
            last_window: Mutex::new(None),
            recent_calls: AtomicUsize::new(0),
        }
    }

    pub fn push_recent(self, response: Result<Option<Series>, StoreError>) -> Self {
        self.recent.lock().unwrap().push_back(response);
        self
    }

    pub fn with_window(self, series: Series) -> Self {
        *self.window.lock().unwrap() = Ok(Some(series));
        self
    }

    pub fn fail_window(self, err: StoreError) -> Self {
        *self.window.lock().unwrap() = Err(err);
        self
    }

    pub fn recent_calls(&self) -> usize {
        self.recent_calls.load(Ordering::SeqCst)
    }

    pub fn last_window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        *self.last_window.lock().unwrap()
    }
}

#[async_trait]
impl TelemetryStore for ScriptedStore {
    async fn query_recent(
        &self,
        _tracker: &TrackerId,
        _limit: u32,
    ) -> Result<Option<Series>, StoreError> {
        self.recent_calls.fetch_add(1, Ordering::SeqCst);
        self.recent.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }

    async fn query_window(
        &self,
        _tracker: &TrackerId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<Series>, StoreError> {
        *self.last_window.lock().unwrap() = Some((start, end));
        match &*self.window.lock().unwrap() {
            Ok(series) => Ok(series.clone()),
            Err(err) => Err(clone_error(err)),
        }
    }
}

// StoreError embeds reqwest errors and cannot derive Clone; the scripted
// variants are all plain data.
fn clone_error(err: &StoreError) -> StoreError {
    match err {
        StoreError::Status { status, snippet } => StoreError::Status {
            status: *status,
            snippet: snippet.clone(),
        },
        StoreError::ContentType(msg) => StoreError::ContentType(msg.clone()),
        StoreError::Schema(msg) => StoreError::Schema(msg.clone()),
        StoreError::Config(msg) => StoreError::Config(msg.clone()),
        StoreError::Http(_) => StoreError::ContentType("transport error".to_string()),
    }
}
