//! Report Data Structures

use chrono::{DateTime, Utc};
use pipebench_core::AggregatePipeline;
use serde::{Deserialize, Serialize};

/// Current report schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Complete run report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    /// Run metadata
    pub meta: ReportMeta,
    /// Benchmarks submitted to the orchestrator, in aggregate order
    pub benchmarks: Vec<BenchmarkEntry>,
    /// Totals
    pub summary: ReportSummary,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportMeta {
    /// Report schema version
    pub schema_version: u32,
    /// Pipebench version that produced the report
    pub version: String,
    /// Report creation time
    pub timestamp: DateTime<Utc>,
    /// Git commit of the working tree, when available
    pub git_commit: Option<String>,
    /// Git branch of the working tree, when available
    pub git_branch: Option<String>,
    /// Name of the aggregate pipeline
    pub pipeline_name: String,
    /// Orchestrator the aggregate was handed to
    pub orchestrator: String,
    /// Replicas per benchmark
    pub runs_per_benchmark: u32,
    /// Name filter pattern, empty when unfiltered
    pub filter: String,
}

/// One benchmark's contribution to the aggregate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BenchmarkEntry {
    /// Fully-qualified benchmark name
    pub name: String,
    /// Qualified component ids
    pub components: Vec<String>,
}

/// Run totals
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportSummary {
    /// Benchmark instances executed
    pub executed: usize,
    /// Named pipelines produced
    pub produced: usize,
    /// Named pipelines that passed the filter
    pub selected: usize,
    /// Components in the aggregate pipeline
    pub components: usize,
}

impl RunReport {
    /// Build a report from the aggregate that was submitted.
    pub fn new(
        meta: ReportMeta,
        aggregate: &AggregatePipeline,
        executed: usize,
        produced: usize,
    ) -> Self {
        let benchmarks: Vec<BenchmarkEntry> = aggregate
            .entries()
            .iter()
            .map(|entry| BenchmarkEntry {
                name: entry.name.clone(),
                components: entry.component_ids.clone(),
            })
            .collect();

        let summary = ReportSummary {
            executed,
            produced,
            selected: benchmarks.len(),
            components: aggregate.components().len(),
        };

        Self {
            meta,
            benchmarks,
            summary,
        }
    }
}
