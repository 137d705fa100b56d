use std::ops::RangeInclusive;

use serde::Serialize;

use crate::error::{ReadinessError, Result};
use crate::models::{Metric, Severity, StatusBucket};

pub const OPTIMAL_THRESHOLD: f64 = 80.0;
pub const CAUTION_THRESHOLD: f64 = 60.0;

/// Stress is lower-is-better: at or under 40% is on target.
pub const STRESS_OPTIMAL_CEILING: f64 = 40.0;
pub const STRESS_CAUTION_CEILING: f64 = 70.0;

/// Daily activity target band, in percent.
pub const ACTIVITY_TARGET_RANGE: RangeInclusive<f64> = 60.0..=85.0;

/// Normal resting HRV band in milliseconds.
pub const HRV_NORMAL_RANGE: RangeInclusive<f64> = 20.0..=80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusLabel {
    pub label: &'static str,
    pub color_token: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityTone {
    pub label: &'static str,
    pub color_token: &'static str,
}

pub fn validate_score(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(ReadinessError::invalid(field, value))
    }
}

/// Buckets a 0-100 readiness score.
pub fn classify(score: f64) -> Result<StatusBucket> {
    validate_score("score", score).map(bucket_for)
}

fn bucket_for(score: f64) -> StatusBucket {
    if score >= OPTIMAL_THRESHOLD {
        StatusBucket::Optimal
    } else if score >= CAUTION_THRESHOLD {
        StatusBucket::Caution
    } else {
        StatusBucket::Critical
    }
}

pub fn classify_metric(metric: Metric, value: f64) -> Result<StatusBucket> {
    match metric {
        Metric::Sleep => validate_score(metric.field(), value).map(bucket_for),
        Metric::Activity => {
            let activity = validate_score(metric.field(), value)?;
            Ok(if ACTIVITY_TARGET_RANGE.contains(&activity) {
                StatusBucket::Optimal
            } else if activity > *ACTIVITY_TARGET_RANGE.end() {
                StatusBucket::Caution
            } else {
                StatusBucket::Critical
            })
        }
        Metric::Stress => {
            let stress = validate_score(metric.field(), value)?;
            Ok(if stress <= STRESS_OPTIMAL_CEILING {
                StatusBucket::Optimal
            } else if stress <= STRESS_CAUTION_CEILING {
                StatusBucket::Caution
            } else {
                StatusBucket::Critical
            })
        }
        Metric::Hrv => {
            if !value.is_finite() || value < 0.0 {
                return Err(ReadinessError::invalid(metric.field(), value));
            }
            Ok(if HRV_NORMAL_RANGE.contains(&value) {
                StatusBucket::Optimal
            } else if value > *HRV_NORMAL_RANGE.end() {
                StatusBucket::Caution
            } else {
                StatusBucket::Critical
            })
        }
    }
}

pub fn severity_color(bucket: StatusBucket) -> StatusLabel {
    let color_token = match bucket {
        StatusBucket::Optimal => "green",
        StatusBucket::Caution => "yellow",
        StatusBucket::Critical => "red",
    };
    StatusLabel {
        label: bucket.label(),
        color_token,
    }
}

pub fn severity_tone(severity: Severity) -> SeverityTone {
    match severity {
        Severity::High => SeverityTone {
            label: "critical",
            color_token: "red",
        },
        Severity::Medium => SeverityTone {
            label: "warning",
            color_token: "yellow",
        },
        Severity::Low => SeverityTone {
            label: "info",
            color_token: "blue",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn boundaries_follow_fixed_thresholds() {
        assert_eq!(classify(80.0).unwrap(), StatusBucket::Optimal);
        assert_eq!(classify(79.0).unwrap(), StatusBucket::Caution);
        assert_eq!(classify(60.0).unwrap(), StatusBucket::Caution);
        assert_eq!(classify(59.0).unwrap(), StatusBucket::Critical);
        assert_eq!(classify(0.0).unwrap(), StatusBucket::Critical);
        assert_eq!(classify(100.0).unwrap(), StatusBucket::Optimal);
    }

    #[test]
    fn rejects_out_of_range_and_nan() {
        for bad in [f64::NAN, -0.5, 100.5, f64::INFINITY] {
            assert!(matches!(
                classify(bad),
                Err(ReadinessError::InvalidInput { field: "score", .. })
            ));
        }
    }

    #[test]
    fn every_integer_score_lands_in_one_bucket() {
        let mut counts = crate::models::BucketCounts::default();
        for score in 0..=100 {
            counts.record(classify(score as f64).unwrap());
        }
        assert_eq!(counts.total(), 101);
        assert_eq!(counts.optimal, 21);
        assert_eq!(counts.caution, 20);
        assert_eq!(counts.critical, 60);
    }

    #[test]
    fn buckets_order_best_first() {
        assert!(StatusBucket::Optimal > StatusBucket::Caution);
        assert!(StatusBucket::Caution > StatusBucket::Critical);
    }

    #[test]
    fn stress_is_lower_is_better() {
        assert_eq!(classify_metric(Metric::Stress, 30.0).unwrap(), StatusBucket::Optimal);
        assert_eq!(classify_metric(Metric::Stress, 65.0).unwrap(), StatusBucket::Caution);
        assert_eq!(classify_metric(Metric::Stress, 85.0).unwrap(), StatusBucket::Critical);
    }

    #[test]
    fn activity_uses_target_band() {
        assert_eq!(classify_metric(Metric::Activity, 70.0).unwrap(), StatusBucket::Optimal);
        assert_eq!(classify_metric(Metric::Activity, 60.0).unwrap(), StatusBucket::Optimal);
        assert_eq!(classify_metric(Metric::Activity, 92.0).unwrap(), StatusBucket::Caution);
        assert_eq!(classify_metric(Metric::Activity, 45.0).unwrap(), StatusBucket::Critical);
        assert!(classify_metric(Metric::Activity, 101.0).is_err());
    }

    #[test]
    fn hrv_uses_normal_band() {
        assert_eq!(classify_metric(Metric::Hrv, 58.0).unwrap(), StatusBucket::Optimal);
        assert_eq!(classify_metric(Metric::Hrv, 95.0).unwrap(), StatusBucket::Caution);
        assert_eq!(classify_metric(Metric::Hrv, 12.0).unwrap(), StatusBucket::Critical);
        assert!(classify_metric(Metric::Hrv, -1.0).is_err());
    }

    #[test]
    fn sleep_errors_name_the_field() {
        let err = classify_metric(Metric::Sleep, 140.0).unwrap_err();
        assert_eq!(err.to_string(), "invalid sleep_quality: 140");
    }

    #[test]
    fn labels_match_buckets() {
        assert_eq!(severity_color(StatusBucket::Caution).label, "Caution");
        assert_eq!(severity_color(StatusBucket::Critical).color_token, "red");
        assert_eq!(severity_tone(Severity::Low).color_token, "blue");
    }

    proptest! {
        #[test]
        fn higher_scores_never_rank_worse(a in 0.0f64..=100.0, b in 0.0f64..=100.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(classify(hi).unwrap() >= classify(lo).unwrap());
        }
    }
}
