//! Relative-change computation against prior periods.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::pipeline::classify;
use crate::types::TrendStats;

/// Ratio of `today` against a baseline. Zero or absent baselines read as
/// "no change" rather than dividing.
fn ratio(today: f64, baseline: Option<f64>) -> f64 {
    match baseline {
        Some(base) if base > 0.0 => (today - base) / base,
        _ => 0.0,
    }
}

/// Trend block for today's step count. The label always derives from the
/// yesterday ratio computed here.
pub fn trend(today_steps: u32, yesterday: Option<f64>, rolling_avg: Option<f64>) -> TrendStats {
    let vs_yesterday = ratio(f64::from(today_steps), yesterday);
    TrendStats {
        vs_yesterday,
        vs_7_day_avg: ratio(f64::from(today_steps), rolling_avg),
        trend_label: classify::trend_label(vs_yesterday),
    }
}

/// Baselines from per-day history deltas: yesterday's delta when that day is
/// present, and the mean over whatever prior days the window produced. The
/// history query is best-effort, so both can be absent.
pub fn history_baselines(
    daily: &BTreeMap<NaiveDate, u32>,
    today: NaiveDate,
) -> (Option<f64>, Option<f64>) {
    let yesterday = today
        .pred_opt()
        .and_then(|d| daily.get(&d))
        .map(|steps| f64::from(*steps));
    let prior: Vec<f64> = daily
        .iter()
        .filter(|(day, _)| **day < today)
        .map(|(_, steps)| f64::from(*steps))
        .collect();
    let rolling = (!prior.is_empty()).then(|| prior.iter().sum::<f64>() / prior.len() as f64);
    (yesterday, rolling)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrendLabel;

    #[test]
    fn ratios_are_relative_change() {
        let stats = trend(5_500, Some(5_000.0), Some(4_400.0));
        assert!((stats.vs_yesterday - 0.1).abs() < 1e-9);
        assert!((stats.vs_7_day_avg - 0.25).abs() < 1e-9);
        assert_eq!(stats.trend_label, TrendLabel::Stable);
    }

    #[test]
    fn label_tracks_the_yesterday_ratio() {
        assert_eq!(trend(6_000, Some(5_000.0), None).trend_label, TrendLabel::Up);
        assert_eq!(trend(4_000, Some(5_000.0), None).trend_label, TrendLabel::Down);
    }

    #[test]
    fn zero_or_missing_baselines_read_as_no_change() {
        let stats = trend(4_200, Some(0.0), None);
        assert_eq!(stats.vs_yesterday, 0.0);
        assert_eq!(stats.vs_7_day_avg, 0.0);
        assert_eq!(stats.trend_label, TrendLabel::Stable);
    }

    #[test]
    fn baselines_come_from_the_right_days() {
        let day = |d: u32| NaiveDate::from_ymd_opt(2026, 1, d).unwrap();
        let daily = BTreeMap::from([(day(23), 4_000), (day(24), 5_000), (day(25), 6_000)]);
        let (yesterday, rolling) = history_baselines(&daily, day(26));
        assert_eq!(yesterday, Some(6_000.0));
        assert_eq!(rolling, Some(5_000.0));
    }

    #[test]
    fn today_rows_in_history_are_ignored_and_gaps_tolerated() {
        let day = |d: u32| NaiveDate::from_ymd_opt(2026, 1, d).unwrap();
        // No entry for the 25th: yesterday is unknown even though older
        // days exist; today's own delta never baselines itself.
        let daily = BTreeMap::from([(day(22), 3_000), (day(26), 9_999)]);
        let (yesterday, rolling) = history_baselines(&daily, day(26));
        assert_eq!(yesterday, None);
        assert_eq!(rolling, Some(3_000.0));
    }

    #[test]
    fn empty_history_yields_no_baselines() {
        let daily = BTreeMap::new();
        let today = NaiveDate::from_ymd_opt(2026, 1, 26).unwrap();
        assert_eq!(history_baselines(&daily, today), (None, None));
    }
}
