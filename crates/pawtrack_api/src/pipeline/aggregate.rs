//! Scalar derivation over one result window.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use pawtrack_telemetry::Series;

use crate::pipeline::rows;
use crate::types::{DEFAULT_BATTERY_VOLTS, DEFAULT_PRESSURE_HPA, DEFAULT_RSRP_DBM, DEFAULT_TEMP_C};

/// Aggregated scalars for one window, before classification. Fields with a
/// documented default are already substituted; `avg_height`, `last_seen` and
/// `species_id` stay `None` when the window never carried them.
#[derive(Clone, Debug, PartialEq)]
pub struct RawMetrics {
    pub steps: u32,
    pub avg_temp: f64,
    pub avg_pressure: i64,
    pub avg_height: Option<f64>,
    pub battery: f64,
    pub rsrp: i32,
    pub last_seen: Option<DateTime<Utc>>,
    pub species_id: Option<i64>,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Reduce a window to scalars. Step counters are cumulative, so the day's
/// steps are the span between the largest and smallest reading, clamped to
/// zero for counter resets; a row without a step column contributes nothing
/// rather than reading as zero. Rows arrive newest-first, so the first row
/// carrying a field is the last-known value.
pub fn aggregate(series: &Series) -> RawMetrics {
    let columns = &series.columns;

    let mut step_span: Option<(f64, f64)> = None;
    let mut temp = Mean::default();
    let mut pressure = Mean::default();
    let mut height = Mean::default();
    let mut battery = None;
    let mut rsrp = None;
    let mut last_seen = None;
    let mut species_id = None;

    for row in &series.values {
        if let Some(step) = rows::numeric_field(columns, row, &rows::STEP) {
            step_span = Some(match step_span {
                Some((min, max)) => (min.min(step), max.max(step)),
                None => (step, step),
            });
        }
        temp.add(rows::numeric_field(columns, row, &rows::TEMP));
        pressure.add(rows::numeric_field(columns, row, &rows::PRESSURE));
        height.add(rows::numeric_field(columns, row, &rows::HEIGHT));

        if battery.is_none() {
            battery = rows::numeric_field(columns, row, &rows::BATTERY);
        }
        if rsrp.is_none() {
            rsrp = rows::numeric_field(columns, row, &rows::RSRP);
        }
        if last_seen.is_none() {
            last_seen = rows::time_field(columns, row);
        }
        if species_id.is_none() {
            species_id = rows::numeric_field(columns, row, &rows::SPECIES).map(|v| v as i64);
        }
    }

    RawMetrics {
        steps: step_span
            .map(|(min, max)| (max - min).max(0.0).round() as u32)
            .unwrap_or(0),
        avg_temp: temp.value().map(round2).unwrap_or(DEFAULT_TEMP_C),
        avg_pressure: pressure
            .value()
            .map(|v| v.round() as i64)
            .unwrap_or(DEFAULT_PRESSURE_HPA),
        avg_height: height.value().map(f64::round),
        battery: battery.map(round2).unwrap_or(DEFAULT_BATTERY_VOLTS),
        rsrp: rsrp.map(|v| v.round() as i32).unwrap_or(DEFAULT_RSRP_DBM),
        last_seen,
        species_id,
    }
}

/// Per-day step deltas for a history window, keyed by UTC calendar day.
/// Days whose rows never carry a step reading are absent, not zero.
pub fn daily_step_deltas(series: &Series) -> BTreeMap<NaiveDate, u32> {
    let columns = &series.columns;
    let mut spans: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for row in &series.values {
        let Some(at) = rows::time_field(columns, row) else {
            continue;
        };
        let Some(step) = rows::numeric_field(columns, row, &rows::STEP) else {
            continue;
        };
        let span = spans.entry(at.date_naive()).or_insert((step, step));
        span.0 = span.0.min(step);
        span.1 = span.1.max(step);
    }
    spans
        .into_iter()
        .map(|(day, (min, max))| (day, (max - min).max(0.0).round() as u32))
        .collect()
}

/// Running mean that distinguishes "no readings" from "zero".
#[derive(Default)]
struct Mean {
    total: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, reading: Option<f64>) {
        if let Some(value) = reading {
            self.total += value;
            self.count += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.total / self.count as f64)
    }
}
