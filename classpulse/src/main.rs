//! classpulse - instructor metrics from attendance records
//!
//! Reads a JSON array of attendance records and prints per-instructor
//! reports or cross-instructor leaderboards.

mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use classpulse_core::analytics::RankingEntry;
use classpulse_core::ingest::{parse_record_set, RecordSet};
use classpulse_core::{Config, InstructorId, MetricsEngine, MonthKey, RankingMetric};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "classpulse")]
#[command(about = "Instructor metrics for fitness studios")]
#[command(version)]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/classpulse/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Full metrics report for one instructor
    Report {
        /// JSON file with attendance records
        #[arg(long)]
        records: PathBuf,

        /// Instructor id
        #[arg(long)]
        instructor: InstructorId,

        /// Focus month (format: YYYY-MM)
        #[arg(long)]
        month: Option<MonthKey>,

        /// Compare the focus month against this month (format: YYYY-MM)
        #[arg(long, requires = "month")]
        compare: Option<MonthKey>,

        /// Score against the other instructors in the file
        #[arg(long)]
        peers: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Leaderboard across all instructors in the file
    Rank {
        /// JSON file with attendance records
        #[arg(long)]
        records: PathBuf,

        /// punctuality, avg_attendees or sessions_per_month
        #[arg(long, default_value = "punctuality")]
        metric: RankingMetric,

        /// Number of entries (default from config)
        #[arg(long)]
        limit: Option<usize>,

        /// Window end date (default: latest session in the file)
        #[arg(long)]
        as_of: Option<NaiveDate>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct RankingReport<'a> {
    metric: RankingMetric,
    as_of: NaiveDate,
    window_days: u32,
    entries: &'a [RankingEntry],
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    Config::ensure_xdg_env();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Config::load().context("failed to load configuration")?,
    };

    let _log_guard = classpulse_core::logging::init(&config.logging).ok();

    let engine = MetricsEngine::with_config(config);

    match cli.command {
        Command::Report {
            records,
            instructor,
            month,
            compare,
            peers,
            format,
        } => report(&engine, &records, instructor, month, compare, peers, format),
        Command::Rank {
            records,
            metric,
            limit,
            as_of,
            format,
        } => rank(&engine, &records, metric, limit, as_of, format),
    }
}

fn load_records(path: &Path) -> Result<RecordSet> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read records from {}", path.display()))?;
    let set = parse_record_set(&json)
        .with_context(|| format!("invalid records in {}", path.display()))?;
    tracing::info!(path = %path.display(), count = set.records.len(), "Loaded records");
    Ok(set)
}

fn report(
    engine: &MetricsEngine,
    path: &Path,
    instructor: InstructorId,
    month: Option<MonthKey>,
    compare: Option<MonthKey>,
    peers: bool,
    format: OutputFormat,
) -> Result<()> {
    let set = load_records(path)?;
    let records = set.for_instructor(instructor);
    if records.is_empty() {
        anyhow::bail!("No records found for instructor {}", instructor);
    }

    let mut params = engine.params();
    if let Some(month) = month {
        params = params.focus(month);
    }
    if let Some(compare) = compare {
        params = params.compare_to(compare);
    }
    if peers {
        let as_of = set.latest_date().unwrap_or_else(|| Local::now().date_naive());
        params = params.with_cohort(engine.cohort(&set.by_instructor(), as_of, Some(instructor)));
    }

    let bundle = engine
        .metrics_bundle(instructor, &records, &params, false)
        .context("failed to compute metrics")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(bundle.as_ref())?),
        OutputFormat::Text => render::print_report(&set.instructor(instructor), &bundle),
    }
    Ok(())
}

fn rank(
    engine: &MetricsEngine,
    path: &Path,
    metric: RankingMetric,
    limit: Option<usize>,
    as_of: Option<NaiveDate>,
    format: OutputFormat,
) -> Result<()> {
    let set = load_records(path)?;
    let as_of = as_of
        .or_else(|| set.latest_date())
        .unwrap_or_else(|| Local::now().date_naive());

    let entries = engine.ranking(&set.by_instructor(), as_of, metric, limit);

    match format {
        OutputFormat::Json => {
            let report = RankingReport {
                metric,
                as_of,
                window_days: engine.config().ranking.window_days,
                entries: &entries,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => render::print_ranking(
            metric,
            &engine.window(as_of),
            &entries,
        ),
    }
    Ok(())
}
