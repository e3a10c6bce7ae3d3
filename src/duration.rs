//! Parser for the platform's `H:MM:SS[.fff]` duration text.

/// The export writes this sentinel for agents with no recorded time.
pub const ZERO_SENTINEL: &str = "0:00:00.000";

/// Parses a `H:MM:SS[.fff]` duration string into seconds.
///
/// Total over all inputs and never panics:
/// - empty text or the `0:00:00.000` sentinel parse to `0.0`;
/// - text that does not split into exactly three `:`-separated parts parses
///   to `0.0`;
/// - a non-numeric component contributes `0` for that component only, so a
///   partially mangled value still keeps its readable parts;
/// - a negative component is clamped to `0`, so no export can drive an
///   aggregate duration sum below zero.
///
/// The hour component may exceed 24 and the seconds component may carry a
/// fractional suffix. Every duration in the crate goes through this function;
/// seconds is the unit for all downstream formulas.
pub fn parse_duration(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() || text == ZERO_SENTINEL {
        return 0.0;
    }

    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 3 {
        return 0.0;
    }

    let hours: f64 = parts[0].parse::<f64>().unwrap_or(0.0).max(0.0);
    let minutes: f64 = parts[1].parse::<f64>().unwrap_or(0.0).max(0.0);
    let seconds: f64 = parts[2].parse::<f64>().unwrap_or(0.0).max(0.0);

    hours * 3600.0 + minutes * 60.0 + seconds
}
