// src/main.rs
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod absence;
mod calendar;
mod capacity;
mod config;
mod error;
mod names;
mod report;
mod tasks;


use absence::RawLeave;
use config::EngineConfig;
use report::{MonthReport, Report, ReportBuilder};
use tasks::{MonthKey, RawTask};

/// Computes monthly workforce capacity and utilization from COR task
/// and Factorial leave snapshots.
#[derive(Parser, Debug)]
#[command(name = "carga", version, about)]
struct Cli {
    /// JSON snapshot of COR tasks, as returned by the fetch layer.
    #[arg(long)]
    tasks: PathBuf,

    /// JSON snapshot of Factorial leaves.
    #[arg(long)]
    leaves: PathBuf,

    /// Engine configuration file; defaults cover the reference
    /// organization when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Restrict output to one month, e.g. "marzo-2025". Required for
    /// CSV output.
    #[arg(long)]
    month: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Output path; stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

fn main() -> Result<()> {
    dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => {
            let config = EngineConfig::default();
            config.validate()?;
            config
        }
    };

    let month_filter = cli
        .month
        .as_deref()
        .map(MonthKey::from_label)
        .transpose()?;

    let all_tasks: Vec<RawTask> = load_snapshot(&cli.tasks)?;
    let all_leaves: Vec<RawLeave> = load_snapshot(&cli.leaves)?;
    info!(
        "Loaded {} tasks and {} leaves",
        all_tasks.len(),
        all_leaves.len()
    );

    let report = ReportBuilder::new(config).build(&all_tasks, &all_leaves);
    if report.is_empty() {
        warn!("No usable task data found; nothing to report");
        return Ok(());
    }

    match cli.format {
        OutputFormat::Json => write_json(&report, month_filter, cli.output.as_deref()),
        OutputFormat::Csv => {
            let Some(key) = month_filter else {
                bail!("CSV output requires --month (e.g. --month marzo-2025)");
            };
            let month = lookup_month(&report, key)?;
            write_csv(month, cli.output.as_deref())
        }
    }
}

fn load_snapshot<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))
}

fn lookup_month(report: &Report, key: MonthKey) -> Result<&MonthReport> {
    report
        .months
        .get(&key)
        .with_context(|| format!("No data for month {}", key))
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

fn write_json(report: &Report, month: Option<MonthKey>, output: Option<&Path>) -> Result<()> {
    let mut out = open_output(output)?;
    let json = match month {
        Some(key) => serde_json::to_string_pretty(lookup_month(report, key)?)?,
        None => serde_json::to_string_pretty(report)?,
    };
    writeln!(out, "{}", json)?;
    Ok(())
}

/// Detail table for one month, with the same columns the dashboard
/// shows per collaborator.
fn write_csv(month: &MonthReport, output: Option<&Path>) -> Result<()> {
    let mut writer = csv::Writer::from_writer(open_output(output)?);
    writer.write_record([
        "colaborador",
        "carga_pct",
        "vacaciones_dias",
        "otras_ausencias_dias",
        "horas_disponibles",
        "horas_estimadas",
        "horas_disponibles_reales",
        "horas_cargadas",
    ])?;
    for (name, record) in &month.employees {
        writer.write_record([
            name.clone(),
            format!("{:.0}", record.load_pct),
            format!("{}", record.vacation_days),
            format!("{}", record.other_absence_days),
            format!("{:.1}", record.available_hours),
            format!("{:.1}", record.estimated_hours),
            format!("{:.1}", record.remaining_hours),
            format!("{:.1}", record.charged_hours),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
