use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classify::validate_score;
use crate::error::{ReadinessError, Result};
use crate::models::{MemberReadiness, Reading, ReadinessScore};

/// One line of a readings export:
/// `subject_id,timestamp,hrv,sleep_quality,activity,stress`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingRow {
    pub subject_id: String,
    pub timestamp: NaiveDateTime,
    pub hrv: f64,
    pub sleep_quality: f64,
    pub activity: f64,
    pub stress: f64,
}

/// One line of a team roster:
/// `subject_id,name,rank,readiness,alerts,computed_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRow {
    pub subject_id: String,
    pub name: Option<String>,
    pub rank: Option<String>,
    pub readiness: f64,
    pub alerts: Option<usize>,
    pub computed_at: NaiveDateTime,
}

pub type ReadingsBySubject = BTreeMap<String, Vec<Reading>>;

pub fn load_readings(path: &Path) -> Result<ReadingsBySubject> {
    let reader = csv::Reader::from_path(path).map_err(|source| csv_error(path, source))?;
    let grouped = collect_readings(reader).map_err(|err| with_path(err, path))?;
    info!(
        path = %path.display(),
        subjects = grouped.len(),
        "loaded readings"
    );
    Ok(grouped)
}

pub fn read_readings<R: io::Read>(input: R) -> Result<ReadingsBySubject> {
    collect_readings(csv::Reader::from_reader(input))
}

fn collect_readings<R: io::Read>(mut reader: csv::Reader<R>) -> Result<ReadingsBySubject> {
    let mut grouped = ReadingsBySubject::new();

    for result in reader.deserialize::<ReadingRow>() {
        let row = result.map_err(|source| csv_error(Path::new("<input>"), source))?;
        let reading = row.to_reading()?;
        grouped.entry(row.subject_id).or_default().push(reading);
    }

    for readings in grouped.values_mut() {
        readings.sort_by_key(|reading| reading.timestamp);
    }
    Ok(grouped)
}

impl ReadingRow {
    pub fn from_reading(subject_id: &str, reading: &Reading) -> Self {
        Self {
            subject_id: subject_id.to_string(),
            timestamp: reading.timestamp,
            hrv: reading.hrv,
            sleep_quality: reading.sleep_quality,
            activity: reading.activity,
            stress: reading.stress,
        }
    }

    pub fn to_reading(&self) -> Result<Reading> {
        if !self.hrv.is_finite() || self.hrv < 0.0 {
            return Err(ReadinessError::invalid("hrv", self.hrv));
        }
        Ok(Reading {
            timestamp: self.timestamp,
            hrv: self.hrv,
            sleep_quality: validate_score("sleep_quality", self.sleep_quality)?,
            activity: validate_score("activity", self.activity)?,
            stress: validate_score("stress", self.stress)?,
        })
    }
}

pub fn load_team(path: &Path) -> Result<Vec<MemberReadiness>> {
    let reader = csv::Reader::from_path(path).map_err(|source| csv_error(path, source))?;
    let members = collect_team(reader).map_err(|err| with_path(err, path))?;
    info!(path = %path.display(), members = members.len(), "loaded team roster");
    Ok(members)
}

pub fn read_team<R: io::Read>(input: R) -> Result<Vec<MemberReadiness>> {
    collect_team(csv::Reader::from_reader(input))
}

fn collect_team<R: io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<MemberReadiness>> {
    let mut members = Vec::new();

    for result in reader.deserialize::<TeamRow>() {
        let row = result.map_err(|source| csv_error(Path::new("<input>"), source))?;
        members.push(MemberReadiness {
            readiness: ReadinessScore {
                subject_id: row.subject_id,
                score: validate_score("readiness", row.readiness)?,
                computed_at: row.computed_at,
            },
            name: row.name.filter(|name| !name.trim().is_empty()),
            rank: row.rank.filter(|rank| !rank.trim().is_empty()),
            alert_count: row.alerts.unwrap_or(0),
        });
    }

    Ok(members)
}

fn csv_error(path: &Path, source: csv::Error) -> ReadinessError {
    ReadinessError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

fn with_path(err: ReadinessError, path: &Path) -> ReadinessError {
    match err {
        ReadinessError::Csv { source, .. } => csv_error(path, source),
        other => other,
    }
}
