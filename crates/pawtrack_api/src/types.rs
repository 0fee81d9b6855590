//! Canonical report shapes served to the dashboard.
//!
//! Field names serialize camelCase and enums SCREAMING_SNAKE_CASE because the
//! consumers are the original dashboard widgets; golden tests below pin the
//! wire contract. Timestamps travel as strings (`lastSeen` RFC3339, `date`
//! YYYY-MM-DD); parsing back into `chrono` types is a pipeline concern.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Daily step goal used for the completion ratio.
pub const STEP_GOAL: u32 = 10_000;

/// Substitutes when an entire window lacks a field. Height deliberately has
/// no default; it stays absent.
pub const DEFAULT_TEMP_C: f64 = 38.5;
pub const DEFAULT_PRESSURE_HPA: i64 = 1013;
pub const DEFAULT_BATTERY_VOLTS: f64 = 3.7;
pub const DEFAULT_RSRP_DBM: i32 = -70;
pub const DEFAULT_STRIDE_M: f64 = 0.45;
pub const DEFAULT_SPECIES_ID: i64 = 1;

/// Shown when a window produced no usable GPS fix at all.
pub const FALLBACK_COORDINATE: Coordinate = Coordinate(31.2304, 121.4737);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActiveLevel {
    Low,
    Normal,
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VitalStatus {
    Normal,
    Warning,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataStatus {
    Normal,
    Degraded,
    Offline,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendLabel {
    Up,
    Stable,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceKind {
    Live,
    Demo,
}

/// One `[latitude, longitude]` pair; serializes as a two-element array.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Coordinate(pub f64, pub f64);

impl Coordinate {
    pub fn lat(&self) -> f64 {
        self.0
    }

    pub fn lng(&self) -> f64 {
        self.1
    }

    /// Zero latitude is the device's "no GPS fix" sentinel, never a reading.
    pub fn is_valid(&self) -> bool {
        self.0.is_finite() && self.1.is_finite() && self.0 != 0.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    pub steps: u32,
    /// steps / goal, clamped to [0, 1].
    pub completion_rate: f64,
    pub active_level: ActiveLevel,
    pub stride: Option<f64>,
}

impl Default for ActivityStats {
    fn default() -> Self {
        Self {
            steps: 0,
            completion_rate: 0.0,
            active_level: ActiveLevel::Low,
            stride: Some(DEFAULT_STRIDE_M),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VitalStats {
    pub avg_temp: f64,
    pub avg_pressure: Option<i64>,
    pub avg_height: Option<f64>,
    pub status: VitalStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendStats {
    pub vs_yesterday: f64,
    pub vs_7_day_avg: f64,
    pub trend_label: TrendLabel,
}

impl Default for TrendStats {
    fn default() -> Self {
        Self {
            vs_yesterday: 0.0,
            vs_7_day_avg: 0.0,
            trend_label: TrendLabel::Stable,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStats {
    pub battery: f64,
    pub data_status: DataStatus,
    pub rsrp: i32,
    /// RFC3339 UTC timestamp of the newest row.
    pub last_seen: String,
}

/// The aggregate root consumed by every dashboard widget. Constructed fresh
/// per fetch; every field has a default so partial upstream data still yields
/// a complete report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    /// YYYY-MM-DD (UTC).
    pub date: String,
    pub pet_id: String,
    pub species_id: i64,
    pub summary: String,
    pub advice: Vec<String>,
    pub activity: ActivityStats,
    pub vitals: VitalStats,
    pub trend: TrendStats,
    pub device: DeviceStats,
    pub coordinates: Vec<Coordinate>,
}

/// Diagnostic channel accompanying every report; consumed by the status
/// badge and operational logs, never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceStatus {
    pub using_fallback: bool,
    pub reason: String,
    pub source_kind: SourceKind,
}

impl SourceStatus {
    pub fn live(reason: impl Into<String>) -> Self {
        Self {
            using_fallback: false,
            reason: reason.into(),
            source_kind: SourceKind::Live,
        }
    }

    pub fn demo(reason: impl Into<String>) -> Self {
        Self {
            using_fallback: true,
            reason: reason.into(),
            source_kind: SourceKind::Demo,
        }
    }
}

/// What one fetch cycle hands to consumers: the report plus why it looks the
/// way it does.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FetchOutcome {
    pub report: DailyReport,
    pub source: SourceStatus,
}
