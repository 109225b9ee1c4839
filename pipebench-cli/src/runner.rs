//! Run Orchestration
//!
//! Drives one run end to end:
//!
//! 1. Validate the runtime configuration and the name filter
//! 2. Apply tag filters and expand each instance into its replicas
//! 3. Run every replica in order
//! 4. Check that produced names are unique across the run
//! 5. Keep the pipelines whose name passes the filter
//! 6. Concatenate them and hand the aggregate to the orchestrator once
//!
//! Every configuration error surfaces before a benchmark body executes, and
//! any failure before step 6 leaves the orchestrator untouched.

use crate::config::{RuntimeConfig, ValidatedConfig};
use crate::orchestrator::Orchestrator;
use crate::planner::{NameFilter, build_plan, expand_replicas};
use anyhow::Context;
use fxhash::FxHashSet;
use pipebench_core::{AggregateError, AggregatePipeline, BenchmarkInstance, NamedPipeline};

/// Inputs of a run besides the benchmark instances
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Runtime configuration
    pub config: RuntimeConfig,
    /// Replica count used when the config does not set one
    pub default_runs_per_benchmark: i64,
    /// Anchored regex on produced pipeline names; empty keeps everything
    pub filter: String,
    /// Only run definitions carrying this tag
    pub tag: Option<String>,
    /// Skip definitions carrying this tag
    pub skip_tag: Option<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            config: RuntimeConfig::local(),
            default_runs_per_benchmark: 1,
            filter: String::new(),
            tag: None,
            skip_tag: None,
        }
    }
}

impl RunOptions {
    /// Options for `config` with defaults everywhere else
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Set the command-line replica default
    pub fn runs_per_benchmark(mut self, runs: i64) -> Self {
        self.default_runs_per_benchmark = runs;
        self
    }

    /// Set the name filter
    pub fn filter(mut self, pattern: impl Into<String>) -> Self {
        self.filter = pattern.into();
        self
    }

    /// Validate the configuration against the replica default
    pub fn validate(&self) -> Result<ValidatedConfig, crate::ConfigError> {
        self.config.validate(self.default_runs_per_benchmark)
    }
}

/// What a successful run did
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Validated configuration the run used
    pub config: ValidatedConfig,
    /// Orchestrator the aggregate was handed to
    pub orchestrator: &'static str,
    /// Names of the replicas that ran, in execution order
    pub executed: Vec<String>,
    /// Every pipeline name produced, in execution order
    pub produced: Vec<String>,
    /// The aggregate handed to the orchestrator
    pub aggregate: AggregatePipeline,
}

impl RunSummary {
    /// Names that passed the filter, in aggregate order
    pub fn selected(&self) -> Vec<&str> {
        self.aggregate.benchmark_names()
    }
}

/// Run `instances` and submit the surviving pipelines to `orchestrator`.
///
/// Instances are executed sorted by name, not in the order given, so the
/// aggregate layout does not depend on how the caller collected them.
/// Within one instance, pipelines keep their `evaluate()` call order.
pub fn run(
    instances: Vec<BenchmarkInstance>,
    options: &RunOptions,
    orchestrator: &dyn Orchestrator,
) -> anyhow::Result<RunSummary> {
    let config = options.validate()?;
    let filter = NameFilter::new(&options.filter)
        .with_context(|| format!("invalid filter pattern `{}`", options.filter))?;

    let plan = build_plan(instances, options.tag.as_deref(), options.skip_tag.as_deref());
    let replicas = expand_replicas(plan.instances, config.runs_per_benchmark);

    tracing::info!(
        replicas = replicas.len(),
        runs_per_benchmark = config.runs_per_benchmark,
        target = config.target.name(),
        "running benchmarks"
    );

    let mut executed = Vec::with_capacity(replicas.len());
    let mut pipelines: Vec<NamedPipeline> = Vec::new();
    for mut replica in replicas {
        let result = replica
            .run()
            .with_context(|| format!("benchmark `{}` failed", replica.name()))?;
        executed.push(replica.name());
        pipelines.extend(result);
    }

    check_unique(&pipelines)?;
    let produced: Vec<String> = pipelines.iter().map(|p| p.name.clone()).collect();

    let selected: Vec<NamedPipeline> = pipelines
        .into_iter()
        .filter(|p| filter.is_match(&p.name))
        .collect();
    if selected.is_empty() {
        tracing::warn!(
            filter = filter.pattern(),
            produced = produced.len(),
            "no pipelines matched the filter"
        );
    }

    let aggregate = AggregatePipeline::concatenate(selected)?;
    tracing::info!(
        orchestrator = orchestrator.name(),
        benchmarks = aggregate.entries().len(),
        components = aggregate.components().len(),
        "submitting aggregate pipeline"
    );
    orchestrator.run(&aggregate, &config)?;

    Ok(RunSummary {
        config,
        orchestrator: orchestrator.name(),
        executed,
        produced,
        aggregate,
    })
}

fn check_unique(pipelines: &[NamedPipeline]) -> Result<(), AggregateError> {
    let mut seen = FxHashSet::default();
    for pipeline in pipelines {
        if !seen.insert(pipeline.name.as_str()) {
            return Err(AggregateError::DuplicateName(pipeline.name.clone()));
        }
    }
    Ok(())
}
