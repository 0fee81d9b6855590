//! Minimal `TelemetryStore` trait and the InfluxDB-compatible wire model.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

pub mod config;
pub mod http_client;
pub mod observability;
pub mod query;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store returned status {status}: {snippet}")]
    Status { status: u16, snippet: String },
    #[error("store answered with non-JSON content: {0}")]
    ContentType(String),
    #[error("unexpected response shape: {0}")]
    Schema(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// True for failures of the transport itself: unreachable host, timeout,
    /// or a non-2xx status.
    pub fn is_transport(&self) -> bool {
        matches!(self, StoreError::Http(_) | StoreError::Status { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, StoreError::Http(e) if e.is_timeout())
    }
}

/// Identity of one monitored pet's telemetry stream.
///
/// Tracker ids are short digit strings (`"221"`). Constraining the charset
/// here keeps statement construction injection-proof: everything interpolated
/// into a query went through this parser first.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TrackerId(String);

impl TrackerId {
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let raw = raw.trim();
        if raw.is_empty() || raw.len() > 16 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(StoreError::Config(format!(
                "invalid tracker id {raw:?}: expected 1-16 digits"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric form, used to seed per-identity generators. Always fits u64:
    /// `parse` caps ids at 16 digits.
    pub fn numeric(&self) -> u64 {
        self.0.parse().unwrap_or(0)
    }
}

impl std::fmt::Display for TrackerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for TrackerId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// One columnar result batch: ordered column names plus fixed-width rows
/// aligned to them. Column names are not stable across device firmware, so
/// consumers resolve fields through alias lookup rather than by position.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Series {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl Series {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.values.len()
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct StatementResult {
    #[serde(default)]
    pub statement_id: Option<u32>,
    #[serde(default)]
    pub series: Option<Vec<Series>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Top-level shape of a `/query` response. Unknown fields are ignored and
/// every expected field is optional, matching how loosely real store
/// deployments fill this envelope.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<StatementResult>,
}

impl QueryResponse {
    /// First series of the first statement, or `None` when the statement
    /// produced no series at all. A statement-level `error` surfaces as
    /// [`StoreError::Schema`] so callers can tell a refused query from an
    /// empty one.
    pub fn into_first_series(self) -> Result<Option<Series>, StoreError> {
        let Some(first) = self.results.into_iter().next() else {
            return Ok(None);
        };
        if let Some(message) = first.error {
            return Err(StoreError::Schema(format!("statement error: {message}")));
        }
        Ok(first.series.into_iter().flatten().next())
    }
}

/// Read access to the pet-activity measurement.
///
/// `Ok(None)` means the statement succeeded but produced no series at all; a
/// series with zero rows comes back as `Ok(Some(..))` so callers can
/// distinguish the two empty shapes when explaining a fallback.
#[async_trait]
pub trait TelemetryStore: Send + Sync + 'static {
    /// Newest rows for one tracker, bounded by `limit`.
    async fn query_recent(
        &self,
        tracker: &TrackerId,
        limit: u32,
    ) -> Result<Option<Series>, StoreError>;

    /// Rows within `[start, end)`, newest first.
    async fn query_window(
        &self,
        tracker: &TrackerId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<Series>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_id_accepts_digit_strings() {
        let id = TrackerId::parse(" 221 ").expect("id");
        assert_eq!(id.as_str(), "221");
        assert_eq!(id.numeric(), 221);
    }

    #[test]
    fn tracker_id_rejects_non_digits() {
        assert!(TrackerId::parse("").is_err());
        assert!(TrackerId::parse("22'; DROP MEASUREMENT").is_err());
        assert!(TrackerId::parse("abc").is_err());
        assert!(TrackerId::parse("12345678901234567").is_err());
    }

    #[test]
    fn parses_columnar_response() {
        let body = r#"{
            "results": [{
                "statement_id": 0,
                "series": [{
                    "name": "pet_activity",
                    "columns": ["time", "step", "temp"],
                    "values": [["2026-01-26T12:00:00Z", 340, 38.6]]
                }]
            }]
        }"#;
        let resp: QueryResponse = serde_json::from_str(body).expect("parse");
        let series = resp.into_first_series().expect("ok").expect("series");
        assert_eq!(series.columns, vec!["time", "step", "temp"]);
        assert_eq!(series.row_count(), 1);
    }

    #[test]
    fn missing_series_reads_as_none() {
        let resp: QueryResponse =
            serde_json::from_str(r#"{"results":[{"statement_id":0}]}"#).expect("parse");
        assert!(resp.into_first_series().expect("ok").is_none());

        let resp: QueryResponse = serde_json::from_str(r#"{}"#).expect("parse");
        assert!(resp.into_first_series().expect("ok").is_none());
    }

    #[test]
    fn empty_series_is_some_with_zero_rows() {
        let body = r#"{"results":[{"series":[{"name":"pet_activity","columns":["time"],"values":[]}]}]}"#;
        let resp: QueryResponse = serde_json::from_str(body).expect("parse");
        let series = resp.into_first_series().expect("ok").expect("series");
        assert!(series.is_empty());
    }

    #[test]
    fn statement_error_becomes_schema_error() {
        let resp: QueryResponse =
            serde_json::from_str(r#"{"results":[{"error":"database not found: pets"}]}"#)
                .expect("parse");
        let err = resp.into_first_series().expect_err("err");
        assert!(matches!(err, StoreError::Schema(msg) if msg.contains("database not found")));
    }

    #[test]
    fn tolerates_unknown_fields() {
        let body = r#"{"results":[{"series":[{"name":"x","columns":["a"],"values":[[1]],"partial":true}],"extra":1}],"uuid":"y"}"#;
        let resp: QueryResponse = serde_json::from_str(body).expect("parse");
        assert!(resp.into_first_series().expect("ok").is_some());
    }
}
