//! JSON Output

use crate::report::RunReport;

/// Generate a prettified JSON report.
///
/// Serializes the run report into machine-readable JSON format.
pub fn generate_json_report(report: &RunReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
