//! InfluxQL statement construction for the pet-activity measurement.
//!
//! Statements are assembled from validated parts only: tracker ids go through
//! [`TrackerId`](crate::TrackerId) and tag values are escaped on top of that,
//! so no caller-supplied text reaches the query verbatim.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::TrackerId;

/// Measurement holding one row per device report.
pub const MEASUREMENT: &str = "pet_activity";

/// Row cap for history windows; a device reporting every few minutes stays
/// well under this across a week.
pub const HISTORY_ROW_LIMIT: u32 = 5000;

/// Escape a value for use inside a single-quoted InfluxQL string literal.
pub fn escape_tag_value(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Newest rows first, bounded.
pub fn recent_activity(tracker: &TrackerId, limit: u32) -> String {
    format!(
        "SELECT * FROM {MEASUREMENT} WHERE tracker_id = '{}' ORDER BY time DESC LIMIT {limit}",
        escape_tag_value(tracker.as_str()),
    )
}

/// Rows with `start <= time < end`, newest first.
pub fn activity_between(
    tracker: &TrackerId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    limit: u32,
) -> String {
    format!(
        "SELECT * FROM {MEASUREMENT} WHERE tracker_id = '{}' AND time >= '{}' AND time < '{}' \
         ORDER BY time DESC LIMIT {limit}",
        escape_tag_value(tracker.as_str()),
        start.to_rfc3339_opts(SecondsFormat::Secs, true),
        end.to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}
