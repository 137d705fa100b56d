use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use readiness_monitor::classify::{classify, classify_metric, severity_color};
use readiness_monitor::config::Thresholds;
use readiness_monitor::models::{Metric, Period, StatusBucket};
use readiness_monitor::{alerts, ingest, report, seed, team, trend};

#[derive(Parser)]
#[command(name = "readiness-monitor")]
#[command(about = "Readiness classification, alerts and team rollups", long_about = None)]
struct Cli {
    /// JSON file overriding alert and trend thresholds
    #[arg(long, global = true, env = "READINESS_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write sample readings and roster CSVs
    Seed {
        #[arg(long, default_value = "sample")]
        dir: PathBuf,
    },
    /// Classify a readiness score or a single metric value
    Classify {
        #[arg(allow_negative_numbers = true)]
        value: f64,
        #[arg(long)]
        metric: Option<Metric>,
        #[arg(long)]
        json: bool,
    },
    /// Derive alerts from a readings CSV
    Alerts {
        #[arg(long)]
        readings: PathBuf,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Summarize metric trends per subject
    Trends {
        #[arg(long)]
        readings: PathBuf,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long, default_value = "7d")]
        period: Period,
        #[arg(long)]
        json: bool,
    },
    /// Roll up team readiness into status buckets
    Team {
        #[arg(long)]
        team: PathBuf,
        /// Readings CSV used to recount alerts per member
        #[arg(long)]
        readings: Option<PathBuf>,
        #[arg(long)]
        bucket: Option<StatusBucket>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        team: PathBuf,
        #[arg(long)]
        readings: PathBuf,
        #[arg(long)]
        scope: Option<String>,
        /// Trend window: 7d for a weekly summary, 30d for a monthly analysis
        #[arg(long, default_value = "7d")]
        period: Period,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let thresholds = match &cli.config {
        Some(path) => Thresholds::load(path)
            .with_context(|| format!("failed to load thresholds from {}", path.display()))?,
        None => Thresholds::default(),
    };
    info!(?thresholds, "thresholds ready");

    match cli.command {
        Commands::Seed { dir } => {
            let (readings, roster) = seed::write_sample(&dir)?;
            println!(
                "Sample data written to {} and {}.",
                readings.display(),
                roster.display()
            );
        }
        Commands::Classify {
            value,
            metric,
            json,
        } => {
            let bucket = match metric {
                Some(metric) => classify_metric(metric, value)?,
                None => classify(value)?,
            };
            let label = severity_color(bucket);
            if json {
                println!("{}", serde_json::to_string_pretty(&label)?);
            } else {
                println!("{value} -> {} ({})", label.label, label.color_token);
            }
        }
        Commands::Alerts {
            readings,
            subject,
            limit,
            json,
        } => {
            let mut grouped = ingest::load_readings(&readings)
                .with_context(|| format!("failed to load {}", readings.display()))?;
            if let Some(subject) = subject.as_deref() {
                grouped.retain(|id, _| id == subject);
            }
            let feed = alerts::merge_feed(&alerts::derive_feed(&grouped, &thresholds.alerts));
            let latest = alerts::latest_alerts(&feed, limit);

            if json {
                println!("{}", serde_json::to_string_pretty(latest)?);
                return Ok(());
            }
            if latest.is_empty() {
                println!("No active alerts.");
                return Ok(());
            }

            println!("Active alerts ({} total):", feed.len());
            for alert in latest {
                println!(
                    "- [{}] {} {} {}",
                    alert.severity, alert.timestamp, alert.subject_id, alert.message
                );
                if let Some(suggestion) = &alert.suggestion {
                    println!("    {suggestion}");
                }
            }
        }
        Commands::Trends {
            readings,
            subject,
            period,
            json,
        } => {
            let mut grouped = ingest::load_readings(&readings)
                .with_context(|| format!("failed to load {}", readings.display()))?;
            if let Some(subject) = subject.as_deref() {
                grouped.retain(|id, _| id == subject);
            }

            let mut summaries = std::collections::BTreeMap::new();
            for (subject_id, series) in grouped.iter() {
                summaries.insert(
                    subject_id.clone(),
                    trend::summarize(series, period, &thresholds.trend)?,
                );
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
                return Ok(());
            }
            if summaries.is_empty() {
                println!("No readings found.");
                return Ok(());
            }

            for (subject_id, summary) in summaries.iter() {
                println!(
                    "{} ({}, {} readings):",
                    subject_id, summary.period_label, summary.sample_count
                );
                for metric in Metric::ALL {
                    println!(
                        "  {:<14} {:>6.1}  {}",
                        metric.label(),
                        summary.averages.get(metric),
                        summary.directions[&metric]
                    );
                }
            }
        }
        Commands::Team {
            team: roster,
            readings,
            bucket,
            limit,
            json,
        } => {
            let mut members = ingest::load_team(&roster)
                .with_context(|| format!("failed to load {}", roster.display()))?;
            if let Some(readings) = readings {
                let grouped = ingest::load_readings(&readings)
                    .with_context(|| format!("failed to load {}", readings.display()))?;
                let feed = alerts::derive_feed(&grouped, &thresholds.alerts);
                members = team::with_alert_counts(&members, &feed);
            }
            let rollup = team::rollup(&members)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&rollup)?);
                return Ok(());
            }

            println!(
                "Team readiness: {} optimal, {} caution, {} critical",
                rollup.counts.optimal, rollup.counts.caution, rollup.counts.critical
            );
            let shown: Vec<_> = match bucket {
                Some(bucket) => rollup.members_in(bucket).take(limit).collect(),
                None => rollup.members.iter().take(limit).collect(),
            };
            if shown.is_empty() {
                println!("No team members in this view.");
                return Ok(());
            }
            for entry in shown {
                println!(
                    "- {} ({}) readiness {:.0} [{}], {} alerts",
                    entry.member.display_name(),
                    entry.member.subject_id(),
                    entry.member.readiness.score,
                    entry.bucket,
                    entry.member.alert_count
                );
            }
        }
        Commands::Report {
            team: roster,
            readings,
            scope,
            period,
            out,
        } => {
            let members = ingest::load_team(&roster)
                .with_context(|| format!("failed to load {}", roster.display()))?;
            let grouped = ingest::load_readings(&readings)
                .with_context(|| format!("failed to load {}", readings.display()))?;
            let report = report::build_report(
                scope.as_deref(),
                Utc::now().naive_utc(),
                period,
                &members,
                &grouped,
                &thresholds,
            )?;
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
