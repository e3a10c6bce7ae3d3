//! Report assembly: runs every calculator over the filtered tables, performs
//! the cross-source checks, and packages the result for the UI/export layer.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::metrics::{
    MetricResult, abandonment_rate, average_adherence, average_handle_time,
    average_speed_of_answer, occupancy, on_queue_utilization, productive_utilization, shrinkage,
    total_calls, transfer_rate,
};
use crate::reconcile::{ReconciliationFinding, Severity, SourceChoice, reconcile};
use crate::rows::{
    filter_adherence_rows, filter_interaction_rows, filter_performance_rows, filter_status_rows,
    filter_time_summary_rows,
};
use crate::tables::Tables;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("required table `{0}` is missing")]
    MissingTable(&'static str),
}

/// Optional caller-supplied expected values, keyed by metric name. When
/// present, each covered metric gains a reconciliation finding against its
/// expected value.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Baseline {
    pub expected: BTreeMap<String, f64>,
}

/// Complete result of one computation run.
#[derive(Debug, Serialize)]
pub struct MetricsReport {
    pub schema_version: u8,
    pub generated_at: DateTime<Utc>,
    pub metrics: Vec<MetricResult>,
    pub findings: Vec<ReconciliationFinding>,
    pub source_choices: Vec<SourceChoice>,
}

impl MetricsReport {
    pub fn has_critical_findings(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Critical)
    }
}

/// Computes the full KPI report. Fails only when a required table is absent;
/// malformed individual rows are filtered or degrade to zero upstream.
pub fn generate_report(
    tables: &Tables,
    baseline: Option<&Baseline>,
) -> Result<MetricsReport, MetricsError> {
    generate_report_at(tables, baseline, Utc::now())
}

/// [`generate_report`] with a pinned timestamp. The report body is a pure
/// function of the inputs; only `generated_at` varies between runs.
pub fn generate_report_at(
    tables: &Tables,
    baseline: Option<&Baseline>,
    generated_at: DateTime<Utc>,
) -> Result<MetricsReport, MetricsError> {
    let status_records = tables
        .agent_status
        .as_deref()
        .ok_or(MetricsError::MissingTable("agent status"))?;
    let performance_records = tables
        .agent_performance
        .as_deref()
        .ok_or(MetricsError::MissingTable("agent performance"))?;
    let interaction_records = tables
        .interactions
        .as_deref()
        .ok_or(MetricsError::MissingTable("interactions"))?;

    // Filter each table exactly once; every calculator below shares these
    // sets so denominators are consistent across metrics.
    let status = filter_status_rows(status_records);
    let performance = filter_performance_rows(performance_records);
    let interactions = filter_interaction_rows(interaction_records);

    let mut metrics = vec![
        total_calls(&interactions),
        transfer_rate(&performance),
        abandonment_rate(&interactions),
        average_speed_of_answer(&interactions),
        average_handle_time(&interactions),
        productive_utilization(&interactions, &status),
        on_queue_utilization(&status),
        shrinkage(&status),
    ];

    if let Some(records) = &tables.adherence {
        let rows = filter_adherence_rows(records);
        if !rows.is_empty() {
            metrics.push(average_adherence(&rows));
        }
    }
    if let Some(records) = &tables.time_summary {
        let rows = filter_time_summary_rows(records);
        if !rows.is_empty() {
            metrics.push(occupancy(&rows));
        }
    }

    // Answered-call totals derivable from two tables; the discrepancy between
    // them is the primary data-integrity signal.
    let perf_answered: f64 = performance.iter().map(|r| r.answered as f64).sum();
    let interaction_answered = interactions.iter().filter(|r| !r.abandoned).count() as f64;

    let mut findings = vec![reconcile(
        "answered calls",
        "performance",
        perf_answered,
        "interactions",
        interaction_answered,
    )];

    // Secondary check: total handle seconds reconstructed from per-agent
    // averages vs. summed per-interaction durations.
    let perf_handle_secs: f64 = performance
        .iter()
        .map(|r| r.answered as f64 * r.avg_handle_secs())
        .sum();
    let interaction_handle_secs: f64 = interactions
        .iter()
        .filter(|r| !r.abandoned)
        .map(|r| r.handle_secs())
        .sum();
    findings.push(reconcile(
        "handle time seconds",
        "performance",
        perf_handle_secs,
        "interactions",
        interaction_handle_secs,
    ));

    // Transfer Rate takes both numerator and denominator from the
    // performance table; disclose the interaction-derived alternative so a
    // reviewer can see what the other choice would have produced.
    let source_choices = vec![SourceChoice {
        metric: "Transfer Rate".to_string(),
        quantity: "answered calls (denominator)".to_string(),
        chosen_source: "performance".to_string(),
        chosen_value: perf_answered,
        alternative_source: "interactions".to_string(),
        alternative_value: interaction_answered,
    }];

    if let Some(baseline) = baseline {
        for (name, expected) in &baseline.expected {
            if let Some(metric) = metrics.iter().find(|m| &m.name == name) {
                findings.push(reconcile(
                    &format!("{name} vs baseline"),
                    "baseline",
                    *expected,
                    "computed",
                    metric.value,
                ));
            }
        }
    }

    info!(
        metrics = metrics.len(),
        findings = findings.len(),
        critical = findings.iter().filter(|f| f.severity == Severity::Critical).count(),
        "Report assembled"
    );

    Ok(MetricsReport {
        schema_version: 1,
        generated_at,
        metrics,
        findings,
        source_choices,
    })
}
