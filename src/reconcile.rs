//! Cross-source reconciliation.
//!
//! The same real-world quantity can often be derived from two different
//! source tables (answered calls from the performance export vs. the
//! interaction export). This module compares such pairs, classifies the
//! discrepancy, and records which source a metric actually used when two
//! candidates disagree. Findings are always attached to the report; a
//! discrepancy is never auto-resolved by guessing.

use serde::Serialize;
use tracing::{error, warn};

use crate::metrics::ratio;

/// Guards the discrepancy ratio when the reference total is zero.
const EPSILON: f64 = 1e-9;

/// Severity of a cross-source discrepancy.
///
/// | Discrepancy      | Severity   |
/// |------------------|------------|
/// | <= 5%            | Acceptable |
/// | > 5% and <= 30%  | Warning    |
/// | > 30%            | Critical   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Acceptable,
    Warning,
    Critical,
}

/// Classifies a discrepancy percentage into a severity band.
pub fn classify(discrepancy_percent: f64) -> Severity {
    match discrepancy_percent {
        p if p <= 5.0 => Severity::Acceptable,
        p if p <= 30.0 => Severity::Warning,
        _ => Severity::Critical,
    }
}

/// Comparison of two independently derived totals for the same quantity.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationFinding {
    pub label: String,
    pub source_a: String,
    pub total_a: f64,
    pub source_b: String,
    pub total_b: f64,
    pub discrepancy: f64,
    pub discrepancy_percent: f64,
    pub severity: Severity,
}

/// Compares two totals and classifies the discrepancy relative to `total_a`.
pub fn reconcile(
    label: &str,
    source_a: &str,
    total_a: f64,
    source_b: &str,
    total_b: f64,
) -> ReconciliationFinding {
    let discrepancy = (total_a - total_b).abs();
    let discrepancy_percent = ratio(discrepancy, total_a.max(EPSILON)) * 100.0;
    let severity = classify(discrepancy_percent);

    match severity {
        Severity::Acceptable => {}
        Severity::Warning => warn!(
            label,
            total_a, total_b, discrepancy_percent, "Cross-source discrepancy"
        ),
        Severity::Critical => error!(
            label,
            total_a, total_b, discrepancy_percent, "Critical cross-source discrepancy"
        ),
    }

    ReconciliationFinding {
        label: label.to_string(),
        source_a: source_a.to_string(),
        total_a,
        source_b: source_b.to_string(),
        total_b,
        discrepancy,
        discrepancy_percent,
        severity,
    }
}

/// Records which of two candidate sources a metric used, and what the value
/// from the alternative source would have been. A metric never mixes a
/// numerator from one table with a denominator from another; this is the
/// disclosure that makes that policy auditable.
#[derive(Debug, Clone, Serialize)]
pub struct SourceChoice {
    pub metric: String,
    pub quantity: String,
    pub chosen_source: String,
    pub chosen_value: f64,
    pub alternative_source: String,
    pub alternative_value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(0.0), Severity::Acceptable);
        assert_eq!(classify(5.0), Severity::Acceptable);
        assert_eq!(classify(5.1), Severity::Warning);
        assert_eq!(classify(30.0), Severity::Warning);
        assert_eq!(classify(30.1), Severity::Critical);
        assert_eq!(classify(100.0), Severity::Critical);
    }

    #[test]
    fn test_reconcile_acceptable() {
        let finding = reconcile("answered calls", "performance", 100.0, "interactions", 104.0);
        assert_eq!(finding.discrepancy, 4.0);
        assert_eq!(finding.discrepancy_percent, 4.0);
        assert_eq!(finding.severity, Severity::Acceptable);
    }

    #[test]
    fn test_reconcile_warning() {
        let finding = reconcile("answered calls", "performance", 100.0, "interactions", 120.0);
        assert_eq!(finding.discrepancy_percent, 20.0);
        assert_eq!(finding.severity, Severity::Warning);
    }

    #[test]
    fn test_reconcile_critical() {
        let finding = reconcile("answered calls", "performance", 100.0, "interactions", 140.0);
        assert_eq!(finding.discrepancy_percent, 40.0);
        assert_eq!(finding.severity, Severity::Critical);
    }

    #[test]
    fn test_reconcile_zero_reference_total() {
        // A zero reference with a non-zero counterpart is maximally suspect
        // but must not divide by zero.
        let finding = reconcile("answered calls", "performance", 0.0, "interactions", 10.0);
        assert!(finding.discrepancy_percent.is_finite());
        assert_eq!(finding.severity, Severity::Critical);
    }

    #[test]
    fn test_reconcile_identical_totals() {
        let finding = reconcile("answered calls", "performance", 50.0, "interactions", 50.0);
        assert_eq!(finding.discrepancy, 0.0);
        assert_eq!(finding.severity, Severity::Acceptable);
    }
}
