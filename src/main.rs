//! CLI entry point for the call-center metrics tool.
//!
//! Provides subcommands for generating a full KPI report from table exports
//! and for gating pipelines on data-integrity checks.

use std::ffi::OsStr;
use std::fs::File;
use std::path::Path;

use anyhow::Result;
use callcenter_metrics::output::{print_pretty, to_json, write_report};
use callcenter_metrics::report::{Baseline, generate_report};
use callcenter_metrics::tables::{Tables, load_csv};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "callcenter_metrics")]
#[command(about = "Workforce KPI reports from call-center exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TableArgs {
    /// Agent status CSV export
    #[arg(long)]
    status: String,

    /// Agent performance CSV export
    #[arg(long)]
    performance: String,

    /// Interaction CSV export
    #[arg(long)]
    interactions: String,

    /// Optional adherence CSV export
    #[arg(long)]
    adherence: Option<String>,

    /// Optional time-summary CSV export
    #[arg(long)]
    time_summary: Option<String>,

    /// Optional JSON file of expected metric values to reconcile against
    #[arg(long)]
    baseline: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the KPI report and print or write it as JSON
    Report {
        #[command(flatten)]
        tables: TableArgs,

        /// File to write the JSON report to (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Compute the report and exit non-zero on any critical finding
    Check {
        #[command(flatten)]
        tables: TableArgs,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/callcenter_metrics.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("callcenter_metrics.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let exit_code = run(cli)?;

    // Flush the non-blocking log writer before exiting; process::exit skips
    // destructors and would lose the final log lines.
    drop(file_guard);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Report { tables, output } => {
            let (tables, baseline) = load_inputs(&tables)?;
            let report = generate_report(&tables, baseline.as_ref())?;
            print_pretty(&report);

            match output {
                Some(path) => write_report(&path, &report)?,
                None => println!("{}", to_json(&report)?),
            }
        }
        Commands::Check { tables } => {
            let (tables, baseline) = load_inputs(&tables)?;
            let report = generate_report(&tables, baseline.as_ref())?;

            if report.has_critical_findings() {
                for finding in &report.findings {
                    error!(
                        label = %finding.label,
                        severity = ?finding.severity,
                        discrepancy_percent = finding.discrepancy_percent,
                        "Finding"
                    );
                }
                return Ok(1);
            }
            info!(findings = report.findings.len(), "No critical findings");
        }
    }

    Ok(0)
}

/// Loads the CSV exports and the optional baseline file.
#[tracing::instrument(skip(args))]
fn load_inputs(args: &TableArgs) -> Result<(Tables, Option<Baseline>)> {
    let mut tables = Tables::new(
        load_csv(Path::new(&args.status))?,
        load_csv(Path::new(&args.performance))?,
        load_csv(Path::new(&args.interactions))?,
    );

    if let Some(path) = &args.adherence {
        tables = tables.with_adherence(load_csv(Path::new(path))?);
    }
    if let Some(path) = &args.time_summary {
        tables = tables.with_time_summary(load_csv(Path::new(path))?);
    }

    let baseline = match &args.baseline {
        Some(path) => Some(serde_json::from_reader(File::open(path)?)?),
        None => None,
    };

    Ok((tables, baseline))
}
