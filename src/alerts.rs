use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::config::AlertConfig;
use crate::models::{Alert, AlertRule, Reading, Severity};

const RULES: [AlertRule; 3] = [
    AlertRule::HrvDrop,
    AlertRule::SleepBelowBaseline,
    AlertRule::ElevatedStress,
];

/// Walks the readings oldest-first, treating each one as the latest sample
/// at its point in time, and returns the fired alerts newest-first.
///
/// The oldest reading only seeds history and never fires, so an alert at
/// time t depends on nothing recorded after t. A rule fires at most once
/// per subject per calendar day; the earliest firing of the day wins.
pub fn derive_alerts(subject_id: &str, readings: &[Reading], config: &AlertConfig) -> Vec<Alert> {
    if readings.len() < 2 {
        debug!(subject_id, count = readings.len(), "not enough readings for alerting");
        return Vec::new();
    }

    let mut ordered = readings.to_vec();
    ordered.sort_by_key(|reading| reading.timestamp);

    let mut fired: BTreeSet<(AlertRule, NaiveDate)> = BTreeSet::new();
    let mut alerts = Vec::new();

    for (index, reading) in ordered.iter().enumerate().skip(1) {
        let history = &ordered[..index];
        for rule in RULES {
            if !rule_fires(rule, history, reading, config) {
                continue;
            }
            let day = reading.timestamp.date();
            if !fired.insert((rule, day)) {
                debug!(subject_id, rule = rule.as_str(), %day, "suppressed repeat alert");
                continue;
            }
            debug!(subject_id, rule = rule.as_str(), at = %reading.timestamp, "alert fired");
            alerts.push(build_alert(subject_id, rule, reading.timestamp));
        }
    }

    alerts.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.severity.cmp(&a.severity))
    });
    alerts
}

/// Alerts for every subject, keyed by subject id.
pub fn derive_feed(
    readings: &BTreeMap<String, Vec<Reading>>,
    config: &AlertConfig,
) -> BTreeMap<String, Vec<Alert>> {
    readings
        .iter()
        .map(|(subject_id, series)| (subject_id.clone(), derive_alerts(subject_id, series, config)))
        .collect()
}

/// Merges per-subject feeds into one newest-first feed.
pub fn merge_feed(feed: &BTreeMap<String, Vec<Alert>>) -> Vec<Alert> {
    let mut merged: Vec<Alert> = feed.values().flatten().cloned().collect();
    merged.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.severity.cmp(&a.severity))
            .then_with(|| a.subject_id.cmp(&b.subject_id))
    });
    merged
}

/// The `limit` most recent alerts of a newest-first feed.
pub fn latest_alerts(alerts: &[Alert], limit: usize) -> &[Alert] {
    &alerts[..limit.min(alerts.len())]
}

fn rule_fires(rule: AlertRule, history: &[Reading], reading: &Reading, config: &AlertConfig) -> bool {
    match rule {
        AlertRule::HrvDrop => hrv_dropped(history, reading, config),
        AlertRule::SleepBelowBaseline => reading.sleep_quality < config.sleep_baseline,
        AlertRule::ElevatedStress => reading.stress > config.stress_ceiling,
    }
}

fn hrv_dropped(history: &[Reading], reading: &Reading, config: &AlertConfig) -> bool {
    if config.hrv_window == 0 || history.len() < config.hrv_window {
        return false;
    }
    let trailing = &history[history.len() - config.hrv_window..];
    let baseline = trailing.iter().map(|r| r.hrv).sum::<f64>() / trailing.len() as f64;
    baseline > 0.0 && (baseline - reading.hrv) / baseline > config.hrv_drop_fraction
}

fn build_alert(subject_id: &str, rule: AlertRule, timestamp: NaiveDateTime) -> Alert {
    let key = format!("{}/{}/{}", subject_id, rule.as_str(), timestamp.date());
    let (severity, message, suggestion) = match rule {
        AlertRule::HrvDrop => (
            Severity::High,
            "Sudden HRV drop detected",
            "Recommend break and stress assessment",
        ),
        AlertRule::SleepBelowBaseline => (
            Severity::Medium,
            "Sleep quality below baseline",
            "Check sleep environment and routine",
        ),
        AlertRule::ElevatedStress => (
            Severity::Low,
            "Elevated stress indicators",
            "Consider scheduling a wellness check-in",
        ),
    };

    Alert {
        id: Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()),
        subject_id: subject_id.to_string(),
        rule,
        timestamp,
        severity,
        message: message.to_string(),
        suggestion: Some(suggestion.to_string()),
    }
}
