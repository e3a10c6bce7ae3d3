//! The input snapshot for one computation run, plus CSV loading for the CLI.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::rows::Record;

/// One run's worth of uploaded tables. The first three are required by the
/// core KPI set; a missing optional table simply omits its dependent
/// metrics.
#[derive(Debug, Default, Clone)]
pub struct Tables {
    pub agent_status: Option<Vec<Record>>,
    pub agent_performance: Option<Vec<Record>>,
    pub interactions: Option<Vec<Record>>,
    pub adherence: Option<Vec<Record>>,
    pub time_summary: Option<Vec<Record>>,
}

impl Tables {
    pub fn new(
        agent_status: Vec<Record>,
        agent_performance: Vec<Record>,
        interactions: Vec<Record>,
    ) -> Self {
        Tables {
            agent_status: Some(agent_status),
            agent_performance: Some(agent_performance),
            interactions: Some(interactions),
            adherence: None,
            time_summary: None,
        }
    }

    pub fn with_adherence(mut self, rows: Vec<Record>) -> Self {
        self.adherence = Some(rows);
        self
    }

    pub fn with_time_summary(mut self, rows: Vec<Record>) -> Self {
        self.time_summary = Some(rows);
        self
    }
}

/// Loads a CSV export into raw rows, header names as field keys.
pub fn load_csv(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut rows = Vec::new();

    for result in rdr.deserialize() {
        let record: HashMap<String, String> = result?;
        rows.push(record);
    }

    debug!(path = %path.display(), rows = rows.len(), "Loaded table");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_csv_maps_headers_to_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Agent Name,Logged In,On Queue").unwrap();
        writeln!(file, "Alice,8:00:00.000,6:00:00.000").unwrap();
        writeln!(file, "Bob,7:30:00.000,5:00:00.000").unwrap();
        file.flush().unwrap();

        let rows = load_csv(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Agent Name"], "Alice");
        assert_eq!(rows[1]["On Queue"], "5:00:00.000");
    }

    #[test]
    fn test_load_csv_missing_file_errors() {
        assert!(load_csv(Path::new("/nonexistent/table.csv")).is_err());
    }
}
