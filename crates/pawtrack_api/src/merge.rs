//! Operator-supplied partial report corrections.
//!
//! A patch mirrors the report shape with every field optional; sub-objects
//! merge field-wise, so overriding one temperature never resets the steps
//! next to it. `petId` is deliberately absent from the patch: identity is
//! the routing key, not payload data.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::types::{ActiveLevel, Coordinate, DailyReport, DataStatus, TrendLabel, VitalStatus};

/// Upper bound on a plausible daily step count for an override.
const MAX_OVERRIDE_STEPS: u32 = 200_000;

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ReportPatch {
    pub date: Option<String>,
    pub species_id: Option<i64>,
    pub summary: Option<String>,
    pub advice: Option<Vec<String>>,
    pub activity: Option<ActivityPatch>,
    pub vitals: Option<VitalsPatch>,
    pub trend: Option<TrendPatch>,
    pub device: Option<DevicePatch>,
    pub coordinates: Option<Vec<Coordinate>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ActivityPatch {
    pub steps: Option<u32>,
    pub completion_rate: Option<f64>,
    pub active_level: Option<ActiveLevel>,
    pub stride: Option<f64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct VitalsPatch {
    pub avg_temp: Option<f64>,
    pub avg_pressure: Option<i64>,
    pub avg_height: Option<f64>,
    pub status: Option<VitalStatus>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct TrendPatch {
    pub vs_yesterday: Option<f64>,
    pub vs_7_day_avg: Option<f64>,
    pub trend_label: Option<TrendLabel>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct DevicePatch {
    pub battery: Option<f64>,
    pub data_status: Option<DataStatus>,
    pub rsrp: Option<i32>,
    pub last_seen: Option<String>,
}

/// All-or-nothing merge: the whole patch is validated before any field is
/// touched, so a rejected override leaves the prior report exactly as it
/// was.
pub fn apply(report: &DailyReport, patch: &ReportPatch) -> ApiResult<DailyReport> {
    validate(patch)?;

    let mut merged = report.clone();
    if let Some(date) = &patch.date {
        merged.date = date.clone();
    }
    if let Some(species_id) = patch.species_id {
        merged.species_id = species_id;
    }
    if let Some(summary) = &patch.summary {
        merged.summary = summary.clone();
    }
    if let Some(advice) = &patch.advice {
        merged.advice = advice.clone();
    }
    if let Some(p) = &patch.activity {
        if let Some(steps) = p.steps {
            merged.activity.steps = steps;
        }
        if let Some(rate) = p.completion_rate {
            merged.activity.completion_rate = rate;
        }
        if let Some(level) = p.active_level {
            merged.activity.active_level = level;
        }
        if let Some(stride) = p.stride {
            merged.activity.stride = Some(stride);
        }
    }
    if let Some(p) = &patch.vitals {
        if let Some(temp) = p.avg_temp {
            merged.vitals.avg_temp = temp;
        }
        if let Some(pressure) = p.avg_pressure {
            merged.vitals.avg_pressure = Some(pressure);
        }
        if let Some(height) = p.avg_height {
            merged.vitals.avg_height = Some(height);
        }
        if let Some(status) = p.status {
            merged.vitals.status = status;
        }
    }
    if let Some(p) = &patch.trend {
        if let Some(v) = p.vs_yesterday {
            merged.trend.vs_yesterday = v;
        }
        if let Some(v) = p.vs_7_day_avg {
            merged.trend.vs_7_day_avg = v;
        }
        if let Some(label) = p.trend_label {
            merged.trend.trend_label = label;
        }
    }
    if let Some(p) = &patch.device {
        if let Some(battery) = p.battery {
            merged.device.battery = battery;
        }
        if let Some(status) = p.data_status {
            merged.device.data_status = status;
        }
        if let Some(rsrp) = p.rsrp {
            merged.device.rsrp = rsrp;
        }
        if let Some(last_seen) = &p.last_seen {
            merged.device.last_seen = last_seen.clone();
        }
    }
    if let Some(coords) = &patch.coordinates {
        // An empty list means "nothing to say about the track", not "erase
        // the track".
        if !coords.is_empty() {
            merged.coordinates = coords.clone();
        }
    }
    Ok(merged)
}

fn validate(patch: &ReportPatch) -> ApiResult<()> {
    if let Some(date) = &patch.date {
        if chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            return reject(format!("date {date:?} is not a YYYY-MM-DD calendar day"));
        }
    }
    if let Some(p) = &patch.activity {
        if let Some(steps) = p.steps {
            if steps > MAX_OVERRIDE_STEPS {
                return reject(format!("steps {steps} exceeds the {MAX_OVERRIDE_STEPS} bound"));
            }
        }
        if let Some(rate) = p.completion_rate {
            if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
                return reject(format!("completionRate {rate} is outside [0, 1]"));
            }
        }
        if let Some(stride) = p.stride {
            if !stride.is_finite() || stride <= 0.0 {
                return reject(format!("stride {stride} is not a positive length"));
            }
        }
    }
    if let Some(p) = &patch.vitals {
        require_finite("avgTemp", p.avg_temp)?;
        require_finite("avgHeight", p.avg_height)?;
    }
    if let Some(p) = &patch.trend {
        require_finite("vsYesterday", p.vs_yesterday)?;
        require_finite("vs7DayAvg", p.vs_7_day_avg)?;
    }
    if let Some(p) = &patch.device {
        require_finite("battery", p.battery)?;
        if let Some(last_seen) = &p.last_seen {
            if chrono::DateTime::parse_from_rfc3339(last_seen).is_err() {
                return reject(format!("lastSeen {last_seen:?} is not an RFC3339 timestamp"));
            }
        }
    }
    if let Some(coords) = &patch.coordinates {
        for (i, coord) in coords.iter().enumerate() {
            if !coord.is_valid() {
                return reject(format!(
                    "coordinates[{i}] = [{}, {}] is not a usable fix",
                    coord.0, coord.1
                ));
            }
        }
    }
    Ok(())
}

fn require_finite(field: &str, value: Option<f64>) -> ApiResult<()> {
    match value {
        Some(v) if !v.is_finite() => reject(format!("{field} {v} is not a finite number")),
        _ => Ok(()),
    }
}

fn reject<T>(message: String) -> ApiResult<T> {
    Err(ApiError::Validation(message))
}
