use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ReadinessError;

/// One periodic physiological sample for a single subject.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    /// Heart rate variability in milliseconds.
    pub hrv: f64,
    pub sleep_quality: f64,
    pub activity: f64,
    pub stress: f64,
}

impl Reading {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Hrv => self.hrv,
            Metric::Sleep => self.sleep_quality,
            Metric::Activity => self.activity,
            Metric::Stress => self.stress,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Hrv,
    Sleep,
    Activity,
    Stress,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Hrv, Metric::Sleep, Metric::Activity, Metric::Stress];

    pub fn higher_is_better(self) -> bool {
        !matches!(self, Metric::Stress)
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Hrv => "HRV",
            Metric::Sleep => "Sleep Quality",
            Metric::Activity => "Activity",
            Metric::Stress => "Stress",
        }
    }

    pub fn field(self) -> &'static str {
        match self {
            Metric::Hrv => "hrv",
            Metric::Sleep => "sleep_quality",
            Metric::Activity => "activity",
            Metric::Stress => "stress",
        }
    }
}

impl FromStr for Metric {
    type Err = ReadinessError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "hrv" => Ok(Metric::Hrv),
            "sleep" | "sleep_quality" => Ok(Metric::Sleep),
            "activity" => Ok(Metric::Activity),
            "stress" => Ok(Metric::Stress),
            _ => Err(ReadinessError::invalid("metric", value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessScore {
    pub subject_id: String,
    pub score: f64,
    pub computed_at: NaiveDateTime,
}

/// Readiness bucket. Variants are declared worst-first so the derived
/// ordering gives `Optimal > Caution > Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusBucket {
    Critical,
    Caution,
    Optimal,
}

impl StatusBucket {
    pub const ALL: [StatusBucket; 3] = [
        StatusBucket::Optimal,
        StatusBucket::Caution,
        StatusBucket::Critical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatusBucket::Optimal => "Optimal",
            StatusBucket::Caution => "Caution",
            StatusBucket::Critical => "Critical",
        }
    }
}

impl fmt::Display for StatusBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StatusBucket {
    type Err = ReadinessError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "optimal" => Ok(StatusBucket::Optimal),
            "caution" => Ok(StatusBucket::Caution),
            "critical" => Ok(StatusBucket::Critical),
            _ => Err(ReadinessError::invalid("bucket", value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertRule {
    HrvDrop,
    SleepBelowBaseline,
    ElevatedStress,
}

impl AlertRule {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertRule::HrvDrop => "hrv-drop",
            AlertRule::SleepBelowBaseline => "sleep-below-baseline",
            AlertRule::ElevatedStress => "elevated-stress",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    pub subject_id: String,
    pub rule: AlertRule,
    pub timestamp: NaiveDateTime,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Improving,
    Stable,
    Declining,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Improving => "improving",
            Direction::Stable => "stable",
            Direction::Declining => "declining",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricAverages {
    pub hrv: f64,
    pub sleep: f64,
    pub activity: f64,
    pub stress: f64,
}

impl MetricAverages {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Hrv => self.hrv,
            Metric::Sleep => self.sleep,
            Metric::Activity => self.activity,
            Metric::Stress => self.stress,
        }
    }
}

/// Trend window: the chart's 24h, 7d and 30d tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    pub fn window(self) -> usize {
        match self {
            Period::Day => 24,
            Period::Week => 7,
            Period::Month => 30,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::Day => "24-hour",
            Period::Week => "7-day",
            Period::Month => "30-day",
        }
    }
}

impl FromStr for Period {
    type Err = ReadinessError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "24h" => Ok(Period::Day),
            "7d" => Ok(Period::Week),
            "30d" => Ok(Period::Month),
            _ => Err(ReadinessError::invalid("period", value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    pub period_label: String,
    pub sample_count: usize,
    pub averages: MetricAverages,
    pub directions: BTreeMap<Metric, Direction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberReadiness {
    pub readiness: ReadinessScore,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
    pub alert_count: usize,
}

impl MemberReadiness {
    pub fn subject_id(&self) -> &str {
        &self.readiness.subject_id
    }

    pub fn display_name(&self) -> String {
        match (&self.rank, &self.name) {
            (Some(rank), Some(name)) => format!("{rank} {name}"),
            (None, Some(name)) => name.clone(),
            _ => self.readiness.subject_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupMember {
    #[serde(flatten)]
    pub member: MemberReadiness,
    pub bucket: StatusBucket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BucketCounts {
    pub optimal: usize,
    pub caution: usize,
    pub critical: usize,
}

impl BucketCounts {
    pub fn record(&mut self, bucket: StatusBucket) {
        match bucket {
            StatusBucket::Optimal => self.optimal += 1,
            StatusBucket::Caution => self.caution += 1,
            StatusBucket::Critical => self.critical += 1,
        }
    }

    pub fn get(&self, bucket: StatusBucket) -> usize {
        match bucket {
            StatusBucket::Optimal => self.optimal,
            StatusBucket::Caution => self.caution,
            StatusBucket::Critical => self.critical,
        }
    }

    pub fn total(&self) -> usize {
        self.optimal + self.caution + self.critical
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRollup {
    pub counts: BucketCounts,
    pub members: Vec<RollupMember>,
}

impl TeamRollup {
    pub fn total(&self) -> usize {
        self.counts.total()
    }

    pub fn members_in(&self, bucket: StatusBucket) -> impl Iterator<Item = &RollupMember> {
        self.members.iter().filter(move |m| m.bucket == bucket)
    }
}
