use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::alerts::{derive_feed, latest_alerts, merge_feed};
use crate::config::Thresholds;
use crate::error::Result;
use crate::ingest::ReadingsBySubject;
use crate::models::{Metric, MemberReadiness, Period, StatusBucket};
use crate::team::{rollup, with_alert_counts};
use crate::trend::summarize;

const RECENT_ALERTS: usize = 5;

/// Renders the markdown report. `period` picks the trend window: a weekly
/// summary or a monthly analysis.
pub fn build_report(
    scope: Option<&str>,
    generated_at: NaiveDateTime,
    period: Period,
    team: &[MemberReadiness],
    readings: &ReadingsBySubject,
    thresholds: &Thresholds,
) -> Result<String> {
    let feed = derive_feed(readings, &thresholds.alerts);
    let rolled = rollup(&with_alert_counts(team, &feed))?;
    let recent = merge_feed(&feed);

    let mut output = String::new();
    let scope_label = scope.unwrap_or("all personnel");

    let _ = writeln!(output, "# Readiness Report");
    let _ = writeln!(output, "Generated for {} at {}", scope_label, generated_at);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Team Readiness");

    if rolled.total() == 0 {
        let _ = writeln!(output, "No team members on the roster.");
    } else {
        for bucket in StatusBucket::ALL {
            let _ = writeln!(output, "- {}: {}", bucket, rolled.counts.get(bucket));
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Members");

    if rolled.members.is_empty() {
        let _ = writeln!(output, "No team members on the roster.");
    } else {
        for entry in rolled.members.iter() {
            let _ = writeln!(
                output,
                "- {} ({}) readiness {:.0} [{}], {} alerts",
                entry.member.display_name(),
                entry.member.subject_id(),
                entry.member.readiness.score,
                entry.bucket,
                entry.member.alert_count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Alerts");

    if recent.is_empty() {
        let _ = writeln!(output, "No active alerts.");
    } else {
        for alert in latest_alerts(&recent, RECENT_ALERTS) {
            let _ = write!(
                output,
                "- [{}] {} on {}: {}",
                alert.severity, alert.subject_id, alert.timestamp, alert.message
            );
            match &alert.suggestion {
                Some(suggestion) => {
                    let _ = writeln!(output, " ({})", suggestion);
                }
                None => {
                    let _ = writeln!(output);
                }
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## {} Trends", period.label());

    if readings.is_empty() {
        let _ = writeln!(output, "No readings recorded.");
    } else {
        for (subject_id, series) in readings.iter() {
            let summary = match summarize(series, period, &thresholds.trend) {
                Ok(summary) => summary,
                Err(_) => {
                    let _ = writeln!(output, "- {}: no data", subject_id);
                    continue;
                }
            };
            let parts: Vec<String> = Metric::ALL
                .iter()
                .map(|metric| {
                    format!(
                        "{} {:.1} ({})",
                        metric.label(),
                        summary.averages.get(*metric),
                        summary.directions[metric]
                    )
                })
                .collect();
            let _ = writeln!(
                output,
                "- {} ({} readings): {}",
                subject_id,
                summary.sample_count,
                parts.join(", ")
            );
        }
    }

    Ok(output)
}
