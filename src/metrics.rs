//! KPI calculators.
//!
//! Each calculator is a pure function over the filtered row sets and returns
//! a [`MetricResult`] carrying the value plus a full calculation trace, so
//! any figure in the report can be re-derived by hand.

use serde::Serialize;

use crate::rows::{
    AdherenceRow, AgentPerformanceRow, AgentStatusRow, InteractionRow, TimeSummaryRow,
};

/// One named aggregate consumed by a metric formula.
#[derive(Debug, Clone, Serialize)]
pub struct TraceInput {
    pub name: String,
    pub value: f64,
}

/// Audit record for a single metric: the formula in words, the aggregates it
/// consumed, and the rendered arithmetic.
#[derive(Debug, Clone, Serialize)]
pub struct CalculationTrace {
    pub formula: String,
    pub inputs: Vec<TraceInput>,
    pub calculation: String,
    pub result: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Count,
    Seconds,
    Percent,
}

/// A single computed KPI.
#[derive(Debug, Clone, Serialize)]
pub struct MetricResult {
    pub name: String,
    pub unit: Unit,
    pub value: f64,
    pub trace: CalculationTrace,
}

/// Zero-denominator guard shared by every ratio in the crate: a ratio with a
/// zero denominator is `0.0`, never an error or an infinity.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn trace_inputs(pairs: &[(&str, f64)]) -> Vec<TraceInput> {
    pairs
        .iter()
        .map(|(name, value)| TraceInput {
            name: name.to_string(),
            value: *value,
        })
        .collect()
}

fn percent_metric(
    name: &str,
    formula: &str,
    inputs: &[(&str, f64)],
    numerator: f64,
    denominator: f64,
) -> MetricResult {
    let value = ratio(numerator, denominator) * 100.0;
    MetricResult {
        name: name.to_string(),
        unit: Unit::Percent,
        value,
        trace: CalculationTrace {
            formula: formula.to_string(),
            inputs: trace_inputs(inputs),
            calculation: format!("{numerator} / {denominator} * 100 = {value:.2}%"),
            result: value,
        },
    }
}

fn mean_seconds_metric(
    name: &str,
    formula: &str,
    inputs: &[(&str, f64)],
    sum_seconds: f64,
    count: f64,
) -> MetricResult {
    let value = ratio(sum_seconds, count);
    MetricResult {
        name: name.to_string(),
        unit: Unit::Seconds,
        value,
        trace: CalculationTrace {
            formula: formula.to_string(),
            inputs: trace_inputs(inputs),
            calculation: format!("{sum_seconds} / {count} = {value:.2}s"),
            result: value,
        },
    }
}

/// Count of interactions that were not abandoned.
pub fn total_calls(interactions: &[InteractionRow]) -> MetricResult {
    let total = interactions.len() as f64;
    let abandoned = interactions.iter().filter(|r| r.abandoned).count() as f64;
    let value = total - abandoned;
    MetricResult {
        name: "Total Calls".to_string(),
        unit: Unit::Count,
        value,
        trace: CalculationTrace {
            formula: "count of interactions with Abandoned = NO".to_string(),
            inputs: trace_inputs(&[("interactions", total), ("abandoned", abandoned)]),
            calculation: format!("{total} - {abandoned} = {value}"),
            result: value,
        },
    }
}

/// Transferred as a share of answered. Both totals come from the performance
/// table so the numerator and denominator always describe the same
/// population.
pub fn transfer_rate(performance: &[AgentPerformanceRow]) -> MetricResult {
    let transferred: f64 = performance.iter().map(|r| r.transferred as f64).sum();
    let answered: f64 = performance.iter().map(|r| r.answered as f64).sum();
    percent_metric(
        "Transfer Rate",
        "sum(Transferred) / sum(Answered) * 100, both from the performance table",
        &[("transferred", transferred), ("answered", answered)],
        transferred,
        answered,
    )
}

/// Share of inbound interactions that were abandoned. Outbound contacts are
/// excluded from both sides of the ratio.
pub fn abandonment_rate(interactions: &[InteractionRow]) -> MetricResult {
    let inbound: Vec<_> = interactions.iter().filter(|r| r.is_inbound()).collect();
    let abandoned = inbound.iter().filter(|r| r.abandoned).count() as f64;
    let inbound_count = inbound.len() as f64;
    percent_metric(
        "Abandonment Rate",
        "count(inbound abandoned) / count(inbound) * 100",
        &[("inbound_abandoned", abandoned), ("inbound", inbound_count)],
        abandoned,
        inbound_count,
    )
}

/// Mean queue wait over inbound, non-abandoned interactions (ASA).
pub fn average_speed_of_answer(interactions: &[InteractionRow]) -> MetricResult {
    let answered: Vec<_> = interactions
        .iter()
        .filter(|r| r.is_inbound() && !r.abandoned)
        .collect();
    let wait_secs: f64 = answered.iter().map(|r| r.queue_wait_secs()).sum();
    let count = answered.len() as f64;
    mean_seconds_metric(
        "Average Speed of Answer",
        "sum(Total Queue) / count, over inbound non-abandoned interactions",
        &[("queue_wait_seconds", wait_secs), ("answered_inbound", count)],
        wait_secs,
        count,
    )
}

/// Mean handle plus after-call-work time over inbound, non-abandoned
/// interactions (AHT).
pub fn average_handle_time(interactions: &[InteractionRow]) -> MetricResult {
    let answered: Vec<_> = interactions
        .iter()
        .filter(|r| r.is_inbound() && !r.abandoned)
        .collect();
    let handle_secs: f64 = answered.iter().map(|r| r.handle_secs()).sum();
    let count = answered.len() as f64;
    mean_seconds_metric(
        "Average Handle Time",
        "sum(Total Handle + Total ACW) / count, over inbound non-abandoned interactions",
        &[("handle_seconds", handle_secs), ("answered_inbound", count)],
        handle_secs,
        count,
    )
}

/// Handle time across all non-abandoned interactions as a share of total
/// logged-in time.
pub fn productive_utilization(
    interactions: &[InteractionRow],
    status: &[AgentStatusRow],
) -> MetricResult {
    let handle_secs: f64 = interactions
        .iter()
        .filter(|r| !r.abandoned)
        .map(|r| r.handle_secs())
        .sum();
    let logged_in_secs: f64 = status.iter().map(|r| r.logged_in_secs()).sum();
    percent_metric(
        "Productive Utilization",
        "sum(Total Handle + Total ACW, non-abandoned) / sum(Logged In) * 100",
        &[("handle_seconds", handle_secs), ("logged_in_seconds", logged_in_secs)],
        handle_secs,
        logged_in_secs,
    )
}

/// On-queue time as a share of logged-in time.
pub fn on_queue_utilization(status: &[AgentStatusRow]) -> MetricResult {
    let on_queue_secs: f64 = status.iter().map(|r| r.on_queue_secs()).sum();
    let logged_in_secs: f64 = status.iter().map(|r| r.logged_in_secs()).sum();
    percent_metric(
        "On-Queue Utilization",
        "sum(On Queue) / sum(Logged In) * 100",
        &[("on_queue_seconds", on_queue_secs), ("logged_in_seconds", logged_in_secs)],
        on_queue_secs,
        logged_in_secs,
    )
}

/// Unavailable time (break, meal, away, not responding, off queue) as a
/// share of logged-in time.
pub fn shrinkage(status: &[AgentStatusRow]) -> MetricResult {
    let shrinkage_secs: f64 = status.iter().map(|r| r.shrinkage_secs()).sum();
    let logged_in_secs: f64 = status.iter().map(|r| r.logged_in_secs()).sum();
    percent_metric(
        "Shrinkage",
        "sum(Break + Meal + Away + Not Responding + Off Queue) / sum(Logged In) * 100",
        &[("shrinkage_seconds", shrinkage_secs), ("logged_in_seconds", logged_in_secs)],
        shrinkage_secs,
        logged_in_secs,
    )
}

/// Mean schedule adherence over the optional adherence table.
pub fn average_adherence(adherence: &[AdherenceRow]) -> MetricResult {
    let sum: f64 = adherence.iter().map(|r| r.adherence_percent).sum();
    let count = adherence.len() as f64;
    let value = ratio(sum, count);
    MetricResult {
        name: "Average Adherence".to_string(),
        unit: Unit::Percent,
        value,
        trace: CalculationTrace {
            formula: "mean of Adherence % over adherence rows".to_string(),
            inputs: trace_inputs(&[("adherence_sum", sum), ("agents", count)]),
            calculation: format!("{sum} / {count} = {value:.2}%"),
            result: value,
        },
    }
}

/// Interacting time as a share of on-queue time, from the optional
/// time-summary table.
pub fn occupancy(time_summary: &[TimeSummaryRow]) -> MetricResult {
    let interacting_secs: f64 = time_summary.iter().map(|r| r.interacting_secs()).sum();
    let on_queue_secs: f64 = time_summary.iter().map(|r| r.on_queue_secs()).sum();
    percent_metric(
        "Occupancy",
        "sum(Interacting) / sum(On Queue) * 100",
        &[("interacting_seconds", interacting_secs), ("on_queue_seconds", on_queue_secs)],
        interacting_secs,
        on_queue_secs,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interaction(direction: &str, abandoned: bool, queue_wait: &str, handle: &str, acw: &str) -> InteractionRow {
        InteractionRow {
            direction: direction.to_string(),
            queue: "Support".to_string(),
            abandoned,
            total_queue: queue_wait.to_string(),
            total_handle: handle.to_string(),
            total_acw: acw.to_string(),
        }
    }

    fn status(logged_in: &str, on_queue: &str) -> AgentStatusRow {
        AgentStatusRow {
            agent_name: "Agent".to_string(),
            logged_in: logged_in.to_string(),
            on_queue: on_queue.to_string(),
            break_time: String::new(),
            meal: String::new(),
            away: String::new(),
            not_responding: String::new(),
            off_queue: String::new(),
        }
    }

    #[test]
    fn test_ratio_zero_denominator() {
        assert_eq!(ratio(10.0, 0.0), 0.0);
        assert_eq!(ratio(3.0, 4.0), 0.75);
    }

    #[test]
    fn test_total_calls_excludes_abandoned_exactly() {
        let rows: Vec<_> = (0..10)
            .map(|i| interaction("Inbound", i == 0, "0:00:30", "0:05:00", "0:01:00"))
            .collect();
        let result = total_calls(&rows);
        assert_eq!(result.value, 9.0);
        assert_eq!(result.trace.result, 9.0);
    }

    #[test]
    fn test_abandonment_rate_inbound_only() {
        // Outbound rows must not enter either side of the ratio.
        let mut rows: Vec<_> = (0..10)
            .map(|i| interaction("Inbound", i == 0, "", "", ""))
            .collect();
        rows.push(interaction("Outbound", true, "", "", ""));
        let result = abandonment_rate(&rows);
        assert_eq!(result.value, 10.0);
    }

    #[test]
    fn test_abandonment_rate_no_inbound_is_zero() {
        let rows = vec![interaction("Outbound", false, "", "", "")];
        assert_eq!(abandonment_rate(&rows).value, 0.0);
        assert_eq!(abandonment_rate(&[]).value, 0.0);
    }

    #[test]
    fn test_abandonment_rate_bounds() {
        let all_abandoned: Vec<_> = (0..5)
            .map(|_| interaction("Inbound", true, "", "", ""))
            .collect();
        assert_eq!(abandonment_rate(&all_abandoned).value, 100.0);
    }

    #[test]
    fn test_transfer_rate_from_performance_table() {
        let rows = vec![
            AgentPerformanceRow {
                agent_name: "Alice".to_string(),
                answered: 80,
                transferred: 8,
                held: 2,
                avg_handle: "0:05:00".to_string(),
            },
            AgentPerformanceRow {
                agent_name: "Bob".to_string(),
                answered: 20,
                transferred: 2,
                held: 0,
                avg_handle: "0:04:00".to_string(),
            },
        ];
        let result = transfer_rate(&rows);
        assert_eq!(result.value, 10.0);
        // Denominator is the performance-table answered total.
        assert_eq!(result.trace.inputs[1].name, "answered");
        assert_eq!(result.trace.inputs[1].value, 100.0);
    }

    #[test]
    fn test_transfer_rate_zero_answered_is_zero() {
        assert_eq!(transfer_rate(&[]).value, 0.0);
    }

    #[test]
    fn test_asa_ignores_abandoned_and_outbound() {
        let rows = vec![
            interaction("Inbound", false, "0:00:30", "0:05:00", "0:01:00"),
            interaction("Inbound", false, "0:00:10", "0:03:00", "0:00:30"),
            interaction("Inbound", true, "0:10:00", "", ""),
            interaction("Outbound", false, "0:10:00", "0:02:00", ""),
        ];
        let result = average_speed_of_answer(&rows);
        assert_eq!(result.value, 20.0);
    }

    #[test]
    fn test_aht_includes_acw() {
        let rows = vec![
            interaction("Inbound", false, "0:00:30", "0:05:00", "0:01:00"),
            interaction("Inbound", false, "0:00:10", "0:03:00", "0:01:00"),
        ];
        // (360 + 240) / 2
        assert_eq!(average_handle_time(&rows).value, 300.0);
    }

    #[test]
    fn test_on_queue_utilization_scenario() {
        let rows = vec![
            status("1:00:00.000", "0:30:00.000"),
            status("2:00:00.000", "1:00:00.000"),
        ];
        assert_eq!(on_queue_utilization(&rows).value, 50.0);
    }

    #[test]
    fn test_shrinkage_over_logged_in() {
        let mut row = status("8:00:00.000", "6:00:00.000");
        row.break_time = "0:30:00.000".to_string();
        row.meal = "0:30:00.000".to_string();
        row.away = "0:30:00.000".to_string();
        row.off_queue = "0:30:00.000".to_string();
        assert_eq!(shrinkage(&[row]).value, 25.0);
    }

    #[test]
    fn test_productive_utilization_counts_outbound_handle_time() {
        // "All non-abandoned" includes outbound contacts.
        let interactions = vec![
            interaction("Inbound", false, "", "0:30:00", ""),
            interaction("Outbound", false, "", "0:30:00", ""),
            interaction("Inbound", true, "", "0:30:00", ""),
        ];
        let status_rows = vec![status("4:00:00.000", "")];
        assert_eq!(productive_utilization(&interactions, &status_rows).value, 25.0);
    }

    #[test]
    fn test_average_adherence() {
        let rows = vec![
            AdherenceRow { agent_name: "A".to_string(), adherence_percent: 90.0 },
            AdherenceRow { agent_name: "B".to_string(), adherence_percent: 100.0 },
        ];
        assert_eq!(average_adherence(&rows).value, 95.0);
        assert_eq!(average_adherence(&[]).value, 0.0);
    }

    #[test]
    fn test_trace_carries_formula_and_inputs() {
        let rows = vec![status("1:00:00.000", "0:30:00.000")];
        let result = on_queue_utilization(&rows);
        assert!(result.trace.formula.contains("On Queue"));
        assert_eq!(result.trace.inputs.len(), 2);
        assert_eq!(result.trace.calculation, "1800 / 3600 * 100 = 50.00%");
        assert_eq!(result.trace.result, result.value);
    }
}
