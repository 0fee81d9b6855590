//! Threshold classification over aggregated scalars.
//!
//! One set of global thresholds for every species and source; the demo
//! generator runs through these same functions, so labels can never
//! contradict the numbers next to them.

use chrono::{DateTime, Duration, Utc};

use crate::pipeline::aggregate::round2;
use crate::types::{ActiveLevel, DataStatus, STEP_GOAL, TrendLabel, VitalStatus};

pub const HIGH_ACTIVITY_STEPS: u32 = 8_000;
pub const NORMAL_ACTIVITY_STEPS: u32 = 4_000;
pub const TEMP_WARN_HIGH_C: f64 = 39.2;
pub const TEMP_WARN_LOW_C: f64 = 37.5;
pub const LOW_BATTERY_VOLTS: f64 = 3.65;
pub const WEAK_SIGNAL_DBM: i32 = -105;
pub const OFFLINE_AFTER_MINUTES: i64 = 10;
pub const TREND_BAND: f64 = 0.1;

pub fn active_level(steps: u32) -> ActiveLevel {
    if steps > HIGH_ACTIVITY_STEPS {
        ActiveLevel::High
    } else if steps > NORMAL_ACTIVITY_STEPS {
        ActiveLevel::Normal
    } else {
        ActiveLevel::Low
    }
}

/// Share of the daily step goal, clamped to `[0, 1]`.
pub fn completion_rate(steps: u32) -> f64 {
    round2((f64::from(steps) / f64::from(STEP_GOAL)).clamp(0.0, 1.0))
}

pub fn vital_status(avg_temp: f64) -> VitalStatus {
    if avg_temp > TEMP_WARN_HIGH_C || avg_temp < TEMP_WARN_LOW_C {
        VitalStatus::Warning
    } else {
        VitalStatus::Normal
    }
}

/// Link health. A stale last-seen wins over weak battery or signal: an
/// offline tracker's radio readings are old news.
pub fn data_status(
    battery: f64,
    rsrp: i32,
    last_seen: DateTime<Utc>,
    now: DateTime<Utc>,
) -> DataStatus {
    if now.signed_duration_since(last_seen) > Duration::minutes(OFFLINE_AFTER_MINUTES) {
        return DataStatus::Offline;
    }
    if battery < LOW_BATTERY_VOLTS || rsrp < WEAK_SIGNAL_DBM {
        DataStatus::Degraded
    } else {
        DataStatus::Normal
    }
}

pub fn trend_label(vs_yesterday: f64) -> TrendLabel {
    if vs_yesterday > TREND_BAND {
        TrendLabel::Up
    } else if vs_yesterday < -TREND_BAND {
        TrendLabel::Down
    } else {
        TrendLabel::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn activity_boundaries_are_strict() {
        assert_eq!(active_level(8_001), ActiveLevel::High);
        assert_eq!(active_level(8_000), ActiveLevel::Normal);
        assert_eq!(active_level(4_001), ActiveLevel::Normal);
        assert_eq!(active_level(4_000), ActiveLevel::Low);
        assert_eq!(active_level(0), ActiveLevel::Low);
    }

    #[test]
    fn completion_rate_clamps_and_rounds() {
        assert_eq!(completion_rate(0), 0.0);
        assert_eq!(completion_rate(6_312), 0.63);
        assert_eq!(completion_rate(10_000), 1.0);
        assert_eq!(completion_rate(23_000), 1.0);
    }

    #[test]
    fn vitals_warn_outside_the_band_only() {
        assert_eq!(vital_status(39.2), VitalStatus::Normal);
        assert_eq!(vital_status(39.21), VitalStatus::Warning);
        assert_eq!(vital_status(37.5), VitalStatus::Normal);
        assert_eq!(vital_status(37.49), VitalStatus::Warning);
        assert_eq!(vital_status(38.5), VitalStatus::Normal);
    }

    #[test]
    fn degraded_on_weak_battery_or_signal() {
        let now = Utc.with_ymd_and_hms(2026, 1, 26, 12, 0, 0).unwrap();
        assert_eq!(data_status(3.64, -70, now, now), DataStatus::Degraded);
        assert_eq!(data_status(3.8, -106, now, now), DataStatus::Degraded);
        assert_eq!(data_status(3.65, -105, now, now), DataStatus::Normal);
    }

    #[test]
    fn offline_wins_over_degraded() {
        let now = Utc.with_ymd_and_hms(2026, 1, 26, 12, 0, 0).unwrap();
        let stale = now - Duration::minutes(11);
        assert_eq!(data_status(3.1, -120, stale, now), DataStatus::Offline);
        // Exactly ten minutes old is still on the air.
        let edge = now - Duration::minutes(10);
        assert_eq!(data_status(3.8, -70, edge, now), DataStatus::Normal);
    }

    #[test]
    fn trend_band_is_exclusive() {
        assert_eq!(trend_label(0.11), TrendLabel::Up);
        assert_eq!(trend_label(0.1), TrendLabel::Stable);
        assert_eq!(trend_label(-0.1), TrendLabel::Stable);
        assert_eq!(trend_label(-0.11), TrendLabel::Down);
        assert_eq!(trend_label(0.0), TrendLabel::Stable);
    }
}
