//! The derivation pipeline: columnar store rows in, canonical report out.
//!
//! Stages run in a fixed order (field resolution, aggregation, coordinate
//! sanitation, classification, trend, assembly) and every stage is total
//! over its input. The whole pipeline is pure: same rows and same clock in,
//! same report out.

pub mod aggregate;
pub mod assemble;
pub mod classify;
pub mod coords;
pub mod rows;
pub mod trend;

use chrono::{DateTime, Utc};
use pawtrack_telemetry::Series;

use crate::types::{DailyReport, TrendStats};

/// Derive a live report from one result window, plus an optional history
/// window backing the trend baselines.
pub fn derive_report(
    pet_id: &str,
    series: &Series,
    history: Option<&Series>,
    now: DateTime<Utc>,
) -> DailyReport {
    let metrics = aggregate::aggregate(series);
    let trend_stats = match history {
        Some(history) => {
            let daily = aggregate::daily_step_deltas(history);
            let (yesterday, rolling) = trend::history_baselines(&daily, now.date_naive());
            trend::trend(metrics.steps, yesterday, rolling)
        }
        None => TrendStats::default(),
    };
    let coordinates = coords::from_series(series);
    assemble::assemble(pet_id, &metrics, trend_stats, coordinates, now)
}
