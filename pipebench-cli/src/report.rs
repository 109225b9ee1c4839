//! Report Assembly
//!
//! Turns a [`RunSummary`] into a [`RunReport`] with metadata about the
//! working tree it ran in.

use crate::runner::RunSummary;
use chrono::Utc;
use pipebench_report::{ReportMeta, RunReport, SCHEMA_VERSION};

/// Build the report for a completed run
pub fn build_report(summary: &RunSummary, filter: &str) -> RunReport {
    RunReport::new(
        build_report_meta(summary, filter),
        &summary.aggregate,
        summary.executed.len(),
        summary.produced.len(),
    )
}

/// Build report metadata including git details
pub fn build_report_meta(summary: &RunSummary, filter: &str) -> ReportMeta {
    ReportMeta {
        schema_version: SCHEMA_VERSION,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        git_commit: git(&["rev-parse", "HEAD"]),
        git_branch: git(&["rev-parse", "--abbrev-ref", "HEAD"]),
        pipeline_name: summary.config.pipeline_name().to_string(),
        orchestrator: summary.orchestrator.to_string(),
        runs_per_benchmark: summary.config.runs_per_benchmark,
        filter: filter.to_string(),
    }
}

fn git(args: &[&str]) -> Option<String> {
    std::process::Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use pipebench_core::AggregatePipeline;

    #[test]
    fn test_build_report() {
        let names = vec![
            "A.benchmark.run_1_of_2".to_string(),
            "A.benchmark.run_2_of_2".to_string(),
        ];
        let summary = RunSummary {
            config: RuntimeConfig::local().validate(2).unwrap(),
            orchestrator: "local",
            executed: names.clone(),
            produced: names,
            aggregate: AggregatePipeline::default(),
        };

        let report = build_report(&summary, "B.*");
        assert_eq!(report.meta.runs_per_benchmark, 2);
        assert_eq!(report.meta.orchestrator, "local");
        assert_eq!(report.meta.pipeline_name, "pipebench");
        assert_eq!(report.meta.filter, "B.*");
        assert_eq!(report.summary.executed, 2);
        assert_eq!(report.summary.selected, 0);
    }
}
