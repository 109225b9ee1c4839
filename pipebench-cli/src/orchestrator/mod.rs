//! Orchestrators
//!
//! An orchestrator receives the aggregate pipeline of a run exactly once.
//! Two are provided:
//!
//! - [`LocalOrchestrator`] - steps through the components in dependency order
//! - [`ClusterOrchestrator`] - compiles a [`PipelinePackage`](pipebench_report::PipelinePackage) to disk

mod cluster;
mod local;

pub use cluster::ClusterOrchestrator;
pub use local::{ComponentExecutor, LocalOrchestrator, LoggingExecutor, execution_order};

use crate::config::{ExecutionTarget, ValidatedConfig};
use pipebench_core::AggregatePipeline;

/// Consumer of an aggregate pipeline
pub trait Orchestrator {
    /// Short name for logs and reports
    fn name(&self) -> &'static str;

    /// Run (or submit) the aggregate pipeline
    fn run(&self, aggregate: &AggregatePipeline, config: &ValidatedConfig) -> anyhow::Result<()>;
}

/// Orchestrator for the configured execution target
pub fn orchestrator_for(config: &ValidatedConfig) -> Box<dyn Orchestrator> {
    match &config.target {
        ExecutionTarget::Local(_) => Box::new(LocalOrchestrator::new()),
        ExecutionTarget::Cluster(_) => Box::new(ClusterOrchestrator),
    }
}
