//! Human-readable Output

use crate::report::RunReport;
use std::fmt::Write;

/// Format a run report for the terminal
pub fn format_human_report(report: &RunReport) -> String {
    let mut output = String::new();
    let meta = &report.meta;

    writeln!(output).ok();
    writeln!(output, "Pipebench Results").ok();
    writeln!(output, "{}", "=".repeat(60)).ok();
    writeln!(output).ok();
    writeln!(output, "Pipeline:     {}", meta.pipeline_name).ok();
    writeln!(output, "Orchestrator: {}", meta.orchestrator).ok();
    writeln!(output, "Replicas:     {}", meta.runs_per_benchmark).ok();
    if !meta.filter.is_empty() {
        writeln!(output, "Filter:       {}", meta.filter).ok();
    }
    if let Some(commit) = &meta.git_commit {
        let short = commit.get(..12).unwrap_or(commit);
        writeln!(output, "Commit:       {}", short).ok();
    }
    writeln!(output).ok();

    for entry in &report.benchmarks {
        writeln!(output, "{}", entry.name).ok();
        for id in &entry.components {
            writeln!(output, "  └── {}", id).ok();
        }
    }
    if report.benchmarks.is_empty() {
        writeln!(output, "(no benchmarks selected)").ok();
    }

    let summary = &report.summary;
    writeln!(output).ok();
    writeln!(output, "{}", "-".repeat(60)).ok();
    writeln!(
        output,
        "{} executed, {} pipelines produced, {} selected, {} components",
        summary.executed, summary.produced, summary.selected, summary.components
    )
    .ok();

    output
}
