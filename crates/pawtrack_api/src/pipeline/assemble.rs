//! Total composition into the canonical report.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::pipeline::aggregate::RawMetrics;
use crate::pipeline::classify;
use crate::types::{
    ActivityStats, Coordinate, DEFAULT_SPECIES_ID, DailyReport, DeviceStats, FALLBACK_COORDINATE,
    TrendStats, VitalStats,
};

/// Build the full report from aggregated scalars. Total by construction:
/// every optional input has a default applied here, so no upstream shortfall
/// can leave a hole in the output. A window that never reported its position
/// reads as seen-now at assembly time.
pub fn assemble(
    pet_id: &str,
    metrics: &RawMetrics,
    trend: TrendStats,
    coordinates: Vec<Coordinate>,
    now: DateTime<Utc>,
) -> DailyReport {
    let last_seen = metrics.last_seen.unwrap_or(now);
    DailyReport {
        date: now.date_naive().to_string(),
        pet_id: pet_id.to_string(),
        species_id: metrics.species_id.unwrap_or(DEFAULT_SPECIES_ID),
        summary: String::new(),
        advice: Vec::new(),
        activity: ActivityStats {
            steps: metrics.steps,
            completion_rate: classify::completion_rate(metrics.steps),
            active_level: classify::active_level(metrics.steps),
            ..ActivityStats::default()
        },
        vitals: VitalStats {
            avg_temp: metrics.avg_temp,
            avg_pressure: Some(metrics.avg_pressure),
            avg_height: metrics.avg_height,
            status: classify::vital_status(metrics.avg_temp),
        },
        trend,
        device: DeviceStats {
            battery: metrics.battery,
            data_status: classify::data_status(metrics.battery, metrics.rsrp, last_seen, now),
            rsrp: metrics.rsrp,
            last_seen: last_seen.to_rfc3339_opts(SecondsFormat::Secs, true),
        },
        coordinates: if coordinates.is_empty() {
            vec![FALLBACK_COORDINATE]
        } else {
            coordinates
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActiveLevel, DataStatus, VitalStatus};
    use chrono::TimeZone;

    fn bare_metrics() -> RawMetrics {
        RawMetrics {
            steps: 0,
            avg_temp: 38.5,
            avg_pressure: 1013,
            avg_height: None,
            battery: 3.7,
            rsrp: -70,
            last_seen: None,
            species_id: None,
        }
    }

    #[test]
    fn all_defaults_still_produce_a_complete_report() {
        let now = Utc.with_ymd_and_hms(2026, 1, 26, 12, 0, 0).unwrap();
        let report = assemble("221", &bare_metrics(), TrendStats::default(), Vec::new(), now);

        assert_eq!(report.date, "2026-01-26");
        assert_eq!(report.pet_id, "221");
        assert_eq!(report.species_id, 1);
        assert_eq!(report.summary, "");
        assert!(report.advice.is_empty());
        assert_eq!(report.activity.active_level, ActiveLevel::Low);
        assert_eq!(report.vitals.status, VitalStatus::Normal);
        // Unknown last-seen reads as seen-now, not as offline since 1970.
        assert_eq!(report.device.data_status, DataStatus::Normal);
        assert_eq!(report.device.last_seen, "2026-01-26T12:00:00Z");
        assert_eq!(report.coordinates, vec![FALLBACK_COORDINATE]);
    }

    #[test]
    fn classifications_match_the_numbers_they_sit_next_to() {
        let now = Utc.with_ymd_and_hms(2026, 1, 26, 12, 0, 0).unwrap();
        let metrics = RawMetrics {
            steps: 9_400,
            avg_temp: 39.4,
            battery: 3.61,
            rsrp: -90,
            last_seen: Some(now - chrono::Duration::minutes(3)),
            species_id: Some(2),
            ..bare_metrics()
        };
        let report = assemble("105", &metrics, TrendStats::default(), Vec::new(), now);

        assert_eq!(report.species_id, 2);
        assert_eq!(report.activity.active_level, ActiveLevel::High);
        assert_eq!(report.activity.completion_rate, 0.94);
        assert_eq!(report.vitals.status, VitalStatus::Warning);
        assert_eq!(report.device.data_status, DataStatus::Degraded);
        assert_eq!(report.device.last_seen, "2026-01-26T11:57:00Z");
    }
}
