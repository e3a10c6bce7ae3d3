//! Typed row records for each source table, plus the per-table validity
//! filters that decide which rows participate in aggregation.
//!
//! Rows arrive as loose field-name→text mappings. Decoding reads the exact
//! field names the platform exports and ignores anything else; filtering is
//! done once per table and the filtered sets are shared by every calculator
//! so all metrics computed from a table see the same denominators.

use std::collections::HashMap;

use tracing::debug;

use crate::duration::{ZERO_SENTINEL, parse_duration};

/// One raw row: field name to text value, as exported by the platform.
pub type Record = HashMap<String, String>;

fn field(record: &Record, name: &str) -> String {
    record.get(name).map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Recognizes template/placeholder agent records that the export includes
/// but that carry no real activity.
fn is_template_name(name: &str) -> bool {
    if name.is_empty() {
        return true;
    }
    let lower = name.to_lowercase();
    lower.contains("template") || lower.contains("placeholder")
}

/// One agent's aggregate time breakdown for the reporting period.
#[derive(Debug, Clone)]
pub struct AgentStatusRow {
    pub agent_name: String,
    pub logged_in: String,
    pub on_queue: String,
    pub break_time: String,
    pub meal: String,
    pub away: String,
    pub not_responding: String,
    pub off_queue: String,
}

impl AgentStatusRow {
    pub fn from_record(record: &Record) -> Self {
        AgentStatusRow {
            agent_name: field(record, "Agent Name"),
            logged_in: field(record, "Logged In"),
            on_queue: field(record, "On Queue"),
            break_time: field(record, "Break"),
            meal: field(record, "Meal"),
            away: field(record, "Away"),
            not_responding: field(record, "Not Responding"),
            off_queue: field(record, "Off Queue"),
        }
    }

    pub fn logged_in_secs(&self) -> f64 {
        parse_duration(&self.logged_in)
    }

    pub fn on_queue_secs(&self) -> f64 {
        parse_duration(&self.on_queue)
    }

    /// Total time the agent was logged in but unavailable for contacts.
    pub fn shrinkage_secs(&self) -> f64 {
        parse_duration(&self.break_time)
            + parse_duration(&self.meal)
            + parse_duration(&self.away)
            + parse_duration(&self.not_responding)
            + parse_duration(&self.off_queue)
    }

    fn is_usable(&self) -> bool {
        !self.logged_in.is_empty()
            && self.logged_in != ZERO_SENTINEL
            && !is_template_name(&self.agent_name)
    }
}

/// One agent's call-handling totals for the reporting period.
#[derive(Debug, Clone)]
pub struct AgentPerformanceRow {
    pub agent_name: String,
    pub answered: u64,
    pub transferred: u64,
    pub held: u64,
    pub avg_handle: String,
}

impl AgentPerformanceRow {
    /// Decodes a performance row. Returns `None` when `Answered` does not
    /// parse as a non-negative integer; such rows are unusable for any
    /// call-count aggregate.
    pub fn from_record(record: &Record) -> Option<Self> {
        let answered: u64 = field(record, "Answered").parse().ok()?;
        Some(AgentPerformanceRow {
            agent_name: field(record, "Agent Name"),
            answered,
            transferred: field(record, "Transferred").parse().unwrap_or(0),
            held: field(record, "Held").parse().unwrap_or(0),
            avg_handle: field(record, "Avg Handle"),
        })
    }

    pub fn avg_handle_secs(&self) -> f64 {
        parse_duration(&self.avg_handle)
    }
}

/// One customer contact from the interaction export.
#[derive(Debug, Clone)]
pub struct InteractionRow {
    pub direction: String,
    pub queue: String,
    pub abandoned: bool,
    pub total_queue: String,
    pub total_handle: String,
    pub total_acw: String,
}

impl InteractionRow {
    pub fn from_record(record: &Record) -> Self {
        InteractionRow {
            direction: field(record, "Initial Direction"),
            queue: field(record, "Queue"),
            abandoned: field(record, "Abandoned").eq_ignore_ascii_case("YES"),
            total_queue: field(record, "Total Queue"),
            total_handle: field(record, "Total Handle"),
            total_acw: field(record, "Total ACW"),
        }
    }

    pub fn is_inbound(&self) -> bool {
        self.direction.eq_ignore_ascii_case("Inbound")
    }

    pub fn queue_wait_secs(&self) -> f64 {
        parse_duration(&self.total_queue)
    }

    /// Talk plus after-call work, the per-contact handle total.
    pub fn handle_secs(&self) -> f64 {
        parse_duration(&self.total_handle) + parse_duration(&self.total_acw)
    }
}

/// One agent's schedule-adherence figure (optional table).
#[derive(Debug, Clone)]
pub struct AdherenceRow {
    pub agent_name: String,
    pub adherence_percent: f64,
}

impl AdherenceRow {
    pub fn from_record(record: &Record) -> Option<Self> {
        let raw = field(record, "Adherence %");
        let percent: f64 = raw.trim_end_matches('%').trim().parse().ok()?;
        Some(AdherenceRow {
            agent_name: field(record, "Agent Name"),
            adherence_percent: percent,
        })
    }
}

/// One agent's on-queue time split (optional time-summary table).
#[derive(Debug, Clone)]
pub struct TimeSummaryRow {
    pub agent_name: String,
    pub on_queue: String,
    pub interacting: String,
}

impl TimeSummaryRow {
    pub fn from_record(record: &Record) -> Self {
        TimeSummaryRow {
            agent_name: field(record, "Agent Name"),
            on_queue: field(record, "On Queue"),
            interacting: field(record, "Interacting"),
        }
    }

    pub fn on_queue_secs(&self) -> f64 {
        parse_duration(&self.on_queue)
    }

    pub fn interacting_secs(&self) -> f64 {
        parse_duration(&self.interacting)
    }
}

/// Keeps status rows with real logged-in time and a non-template name.
pub fn filter_status_rows(records: &[Record]) -> Vec<AgentStatusRow> {
    let rows: Vec<_> = records
        .iter()
        .map(AgentStatusRow::from_record)
        .filter(AgentStatusRow::is_usable)
        .collect();
    debug!(kept = rows.len(), total = records.len(), "Filtered agent status rows");
    rows
}

/// Keeps performance rows whose `Answered` field is a valid count and whose
/// agent is not a template record.
pub fn filter_performance_rows(records: &[Record]) -> Vec<AgentPerformanceRow> {
    let rows: Vec<_> = records
        .iter()
        .filter_map(AgentPerformanceRow::from_record)
        .filter(|r| !is_template_name(&r.agent_name))
        .collect();
    debug!(kept = rows.len(), total = records.len(), "Filtered agent performance rows");
    rows
}

/// Keeps interaction rows that carry both a direction and a queue.
///
/// Deliberately does not look at agent-assignment fields: abandoned contacts
/// have no assigned agent and must stay eligible for abandonment metrics.
pub fn filter_interaction_rows(records: &[Record]) -> Vec<InteractionRow> {
    let rows: Vec<_> = records
        .iter()
        .map(InteractionRow::from_record)
        .filter(|r| !r.direction.is_empty() && !r.queue.is_empty())
        .collect();
    debug!(kept = rows.len(), total = records.len(), "Filtered interaction rows");
    rows
}

/// Keeps adherence rows with a parseable adherence figure.
pub fn filter_adherence_rows(records: &[Record]) -> Vec<AdherenceRow> {
    let rows: Vec<_> = records.iter().filter_map(AdherenceRow::from_record).collect();
    debug!(kept = rows.len(), total = records.len(), "Filtered adherence rows");
    rows
}

/// Keeps time-summary rows with a non-template agent name.
pub fn filter_time_summary_rows(records: &[Record]) -> Vec<TimeSummaryRow> {
    let rows: Vec<_> = records
        .iter()
        .map(TimeSummaryRow::from_record)
        .filter(|r| !is_template_name(&r.agent_name))
        .collect();
    debug!(kept = rows.len(), total = records.len(), "Filtered time summary rows");
    rows
}
