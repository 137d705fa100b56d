use std::collections::BTreeMap;

use crate::config::TrendConfig;
use crate::error::{ReadinessError, Result};
use crate::models::{Direction, Metric, MetricAverages, Period, Reading, TrendSummary};

/// Summarizes the most recent `period` readings (or all of them if fewer).
///
/// Direction compares the first half of the window against the second. For
/// odd windows the middle reading belongs to both halves, so a single
/// reading is compared with itself and reads as `Stable`.
pub fn summarize(readings: &[Reading], period: Period, config: &TrendConfig) -> Result<TrendSummary> {
    if readings.is_empty() {
        return Err(ReadinessError::InsufficientData("no readings to summarize"));
    }

    let mut ordered = readings.to_vec();
    ordered.sort_by_key(|reading| reading.timestamp);
    let start = ordered.len().saturating_sub(period.window());
    let window = &ordered[start..];

    let len = window.len();
    let first = mean_of(&window[..(len + 1) / 2]);
    let second = mean_of(&window[len / 2..]);

    let directions: BTreeMap<Metric, Direction> = Metric::ALL
        .into_iter()
        .map(|metric| {
            let direction = direction_of(metric, first.get(metric), second.get(metric), config.epsilon);
            (metric, direction)
        })
        .collect();

    Ok(TrendSummary {
        period_label: period.label().to_string(),
        sample_count: len,
        averages: mean_of(window),
        directions,
    })
}

pub fn direction_of(metric: Metric, before: f64, after: f64, epsilon: f64) -> Direction {
    let delta = if metric.higher_is_better() {
        after - before
    } else {
        before - after
    };
    if delta > epsilon {
        Direction::Improving
    } else if delta < -epsilon {
        Direction::Declining
    } else {
        Direction::Stable
    }
}

/// Trailing mean at every reading, the window clipped at the start.
pub fn rolling_averages(readings: &[Reading], window: usize) -> Result<Vec<MetricAverages>> {
    if window == 0 {
        return Err(ReadinessError::invalid("window", window));
    }
    let mut ordered = readings.to_vec();
    ordered.sort_by_key(|reading| reading.timestamp);

    Ok((0..ordered.len())
        .map(|end| {
            let start = (end + 1).saturating_sub(window);
            mean_of(&ordered[start..=end])
        })
        .collect())
}

/// Percent change from `previous` to `current`, as shown on the metric
/// badges ("7-day trend: +4%").
pub fn percent_change(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return None;
    }
    Some((current - previous) / previous.abs() * 100.0)
}

fn mean_of(readings: &[Reading]) -> MetricAverages {
    if readings.is_empty() {
        return MetricAverages::default();
    }
    let n = readings.len() as f64;
    let mean = |metric: Metric| readings.iter().map(|r| r.value(metric)).sum::<f64>() / n;
    MetricAverages {
        hrv: mean(Metric::Hrv),
        sleep: mean(Metric::Sleep),
        activity: mean(Metric::Activity),
        stress: mean(Metric::Stress),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(7, 30, 0))
            .unwrap()
    }

    fn series(values: &[(f64, f64, f64, f64)]) -> Vec<Reading> {
        values
            .iter()
            .enumerate()
            .map(|(i, &(hrv, sleep_quality, activity, stress))| Reading {
                timestamp: start() + Duration::days(i as i64),
                hrv,
                sleep_quality,
                activity,
                stress,
            })
            .collect()
    }

    #[test]
    fn empty_input_is_insufficient() {
        let result = summarize(&[], Period::Week, &TrendConfig::default());
        assert!(matches!(result, Err(ReadinessError::InsufficientData(_))));
    }

    #[test]
    fn single_reading_is_its_own_average_and_stable() {
        let readings = series(&[(50.0, 50.0, 50.0, 50.0)]);
        let summary = summarize(&readings, Period::Week, &TrendConfig::default()).unwrap();
        assert_eq!(summary.sample_count, 1);
        assert_eq!(
            summary.averages,
            MetricAverages {
                hrv: 50.0,
                sleep: 50.0,
                activity: 50.0,
                stress: 50.0
            }
        );
        assert!(summary.directions.values().all(|d| *d == Direction::Stable));
        assert_eq!(summary.directions.len(), 4);
    }

    #[test]
    fn window_keeps_most_recent_readings() {
        let mut values = vec![(10.0, 10.0, 10.0, 90.0); 5];
        values.extend(vec![(60.0, 80.0, 70.0, 30.0); 7]);
        let summary = summarize(&series(&values), Period::Week, &TrendConfig::default()).unwrap();
        assert_eq!(summary.sample_count, 7);
        assert_eq!(summary.period_label, "7-day");
        assert_eq!(summary.averages.hrv, 60.0);
        assert_eq!(summary.averages.stress, 30.0);
    }

    #[test]
    fn day_and_month_windows_cut_at_24_and_30() {
        let values: Vec<(f64, f64, f64, f64)> = (0..40)
            .map(|i| {
                let v = if i < 10 { 10.0 } else { 60.0 };
                (v, v, v, 100.0 - v)
            })
            .collect();
        let readings = series(&values);
        let config = TrendConfig::default();

        let month = summarize(&readings, Period::Month, &config).unwrap();
        assert_eq!(month.sample_count, 30);
        assert_eq!(month.period_label, "30-day");
        assert_eq!(month.averages.hrv, 60.0);

        let day = summarize(&readings, Period::Day, &config).unwrap();
        assert_eq!(day.sample_count, 24);
        assert_eq!(day.averages.stress, 40.0);

        let short = summarize(&readings[..12], Period::Month, &config).unwrap();
        assert_eq!(short.sample_count, 12);
    }

    #[test]
    fn falling_stress_counts_as_improving() {
        let readings = series(&[
            (40.0, 60.0, 70.0, 70.0),
            (40.0, 60.0, 70.0, 70.0),
            (50.0, 60.0, 60.0, 40.0),
            (50.0, 60.0, 60.0, 40.0),
        ]);
        let summary = summarize(&readings, Period::Month, &TrendConfig::default()).unwrap();
        assert_eq!(summary.directions[&Metric::Stress], Direction::Improving);
        assert_eq!(summary.directions[&Metric::Hrv], Direction::Improving);
        assert_eq!(summary.directions[&Metric::Sleep], Direction::Stable);
        assert_eq!(summary.directions[&Metric::Activity], Direction::Declining);
    }

    #[test]
    fn changes_inside_epsilon_are_stable() {
        assert_eq!(direction_of(Metric::Sleep, 70.0, 70.8, 1.0), Direction::Stable);
        assert_eq!(direction_of(Metric::Sleep, 70.0, 72.0, 1.0), Direction::Improving);
        assert_eq!(direction_of(Metric::Stress, 30.0, 33.0, 1.0), Direction::Declining);
    }

    #[test]
    fn rolling_average_clips_at_start() {
        let readings = series(&[
            (40.0, 60.0, 60.0, 30.0),
            (50.0, 70.0, 60.0, 30.0),
            (60.0, 80.0, 60.0, 30.0),
        ]);
        let rolled = rolling_averages(&readings, 2).unwrap();
        assert_eq!(rolled.len(), 3);
        assert_eq!(rolled[0].hrv, 40.0);
        assert_eq!(rolled[1].hrv, 45.0);
        assert_eq!(rolled[2].sleep, 75.0);
        assert!(rolling_averages(&readings, 0).is_err());
    }

    #[test]
    fn percent_change_handles_zero_base() {
        assert!((percent_change(50.0, 55.0).unwrap() - 10.0).abs() < 1e-9);
        assert!((percent_change(80.0, 60.0).unwrap() + 25.0).abs() < 1e-9);
        assert_eq!(percent_change(0.0, 10.0), None);
    }
}
