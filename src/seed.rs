use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::ingest::{ReadingRow, TeamRow};

const WEEK_START: (i32, u32, u32) = (2024, 6, 17);

/// Per-day (hrv, sleep, activity, stress), Monday first.
const SUBJECT_WEEKS: [(&str, [(f64, f64, f64, f64); 7]); 3] = [
    (
        "ops-01",
        [
            (42.0, 72.0, 58.0, 45.0),
            (48.0, 80.0, 62.0, 38.0),
            (35.0, 62.0, 68.0, 68.0),
            (52.0, 83.0, 78.0, 32.0),
            (45.0, 75.0, 72.0, 48.0),
            (59.0, 88.0, 82.0, 28.0),
            (55.0, 85.0, 68.0, 33.0),
        ],
    ),
    (
        "ops-02",
        [
            (45.0, 75.0, 60.0, 40.0),
            (52.0, 82.0, 65.0, 35.0),
            (38.0, 65.0, 70.0, 65.0),
            (55.0, 85.0, 80.0, 30.0),
            (48.0, 78.0, 75.0, 45.0),
            (62.0, 90.0, 85.0, 25.0),
            (58.0, 88.0, 70.0, 30.0),
        ],
    ),
    (
        "ops-03",
        [
            (56.0, 78.0, 66.0, 42.0),
            (54.0, 74.0, 64.0, 48.0),
            (55.0, 71.0, 60.0, 55.0),
            (52.0, 68.0, 58.0, 61.0),
            (50.0, 66.0, 55.0, 66.0),
            (49.0, 64.0, 52.0, 72.0),
            (38.0, 58.0, 48.0, 78.0),
        ],
    ),
];

const TEAM: [(&str, &str, &str, f64); 4] = [
    ("ops-01", "Avery Lee", "Sgt.", 72.0),
    ("ops-02", "Jules Moreno", "Cpl.", 88.0),
    ("ops-03", "Kiara Patel", "Lt.", 54.0),
    ("ops-04", "Devon Brooks", "Pvt.", 81.0),
];

fn day_at(offset: i64, hour: u32) -> anyhow::Result<NaiveDateTime> {
    let (year, month, day) = WEEK_START;
    let start = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .context("invalid seed date")?;
    Ok(start + Duration::days(offset))
}

pub fn reading_rows() -> anyhow::Result<Vec<ReadingRow>> {
    let mut rows = Vec::new();
    for (subject_id, week) in SUBJECT_WEEKS.iter() {
        for (offset, &(hrv, sleep_quality, activity, stress)) in week.iter().enumerate() {
            rows.push(ReadingRow {
                subject_id: subject_id.to_string(),
                timestamp: day_at(offset as i64, 7)?,
                hrv,
                sleep_quality,
                activity,
                stress,
            });
        }
    }
    Ok(rows)
}

pub fn team_rows() -> anyhow::Result<Vec<TeamRow>> {
    let computed_at = day_at(6, 9)?;
    Ok(TEAM
        .iter()
        .map(|&(subject_id, name, rank, readiness)| TeamRow {
            subject_id: subject_id.to_string(),
            name: Some(name.to_string()),
            rank: Some(rank.to_string()),
            readiness,
            alerts: None,
            computed_at,
        })
        .collect())
}

/// Writes `readings.csv` and `team.csv` into `dir`, returning both paths.
pub fn write_sample(dir: &Path) -> anyhow::Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let readings_path = dir.join("readings.csv");
    let mut writer = csv::Writer::from_path(&readings_path)?;
    for row in reading_rows()? {
        writer.serialize(row)?;
    }
    writer.flush()?;

    let team_path = dir.join("team.csv");
    let mut writer = csv::Writer::from_path(&team_path)?;
    for row in team_rows()? {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok((readings_path, team_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{load_readings, load_team};

    #[test]
    fn sample_files_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let (readings_path, team_path) = write_sample(dir.path()).unwrap();

        let readings = load_readings(&readings_path).unwrap();
        assert_eq!(readings.len(), 3);
        assert!(readings.values().all(|week| week.len() == 7));

        let team = load_team(&team_path).unwrap();
        assert_eq!(team.len(), 4);
        assert_eq!(team[2].display_name(), "Lt. Kiara Patel");
    }
}
