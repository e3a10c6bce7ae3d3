//! Workforce KPI engine for call-center platform exports.
//!
//! Consumes tabular exports (agent status, agent performance, per-call
//! interactions, optional adherence and time-summary tables) and produces a
//! report of workforce KPIs, each with a full calculation trace, plus
//! cross-source reconciliation findings classified by severity.

pub mod duration;
pub mod metrics;
pub mod output;
pub mod reconcile;
pub mod report;
pub mod rows;
pub mod tables;
