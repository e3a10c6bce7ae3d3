//! Output formatting and persistence for metrics reports.

use std::fs;
use std::path::Path;

use anyhow::Result;
use tracing::{debug, info};

use crate::report::MetricsReport;

/// Logs the report using Rust's debug pretty-print format.
pub fn print_pretty(report: &MetricsReport) {
    debug!("{:#?}", report);
}

/// Renders the report as pretty-printed JSON.
pub fn to_json(report: &MetricsReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Writes the report as pretty-printed JSON to a file.
pub fn write_report(path: &str, report: &MetricsReport) -> Result<()> {
    let json = to_json(report)?;
    debug!(path, bytes = json.len(), "Writing report");
    fs::write(Path::new(path), json)?;
    info!(path, "Report written");
    Ok(())
}
