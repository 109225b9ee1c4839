#![warn(missing_docs)]
//! Pipebench Report - Run Reports and Pipeline Packages
//!
//! Generates output for a completed run:
//! - JSON (machine-readable)
//! - Human-readable terminal summary
//!
//! Also defines the [`PipelinePackage`] the cluster orchestrator writes.

mod human;
mod json;
mod package;
mod report;

pub use human::format_human_report;
pub use json::generate_json_report;
pub use package::{PackageChannel, PackageComponent, PipelinePackage};
pub use report::{BenchmarkEntry, ReportMeta, ReportSummary, RunReport, SCHEMA_VERSION};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON with full schema
    Json,
    /// Human-readable terminal output
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}
