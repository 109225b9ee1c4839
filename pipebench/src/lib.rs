#![warn(missing_docs)]
//! # Pipebench
//!
//! Benchmark orchestration for machine-learning pipelines.
//!
//! A benchmark assembles a pipeline of components and calls `evaluate()` on
//! it. Pipebench takes care of the rest:
//! - **Discovery**: `#[benchmark]` definitions register at link time and are found through an explicit `extends` hierarchy
//! - **Hierarchical Naming**: every evaluation is named `<Class>.<method>[.<sub-benchmark>...][.run_k_of_n]`
//! - **Sub-benchmarks**: scoped guards nest arbitrarily deep and always pop, even on early return
//! - **Single Evaluation**: evaluating the same scope twice fails the run
//! - **Replication**: each benchmark runs `runs_per_benchmark` times under distinct names
//! - **Aggregation**: every surviving pipeline is concatenated and handed to one orchestrator
//!
//! ## Quick Start
//!
//! ```ignore
//! use pipebench::prelude::*;
//!
//! #[benchmark]
//! fn titanic_benchmark(b: &mut Benchmark) -> anyhow::Result<()> {
//!     let pipeline = build_pipeline()?;
//!     b.evaluate_pipeline(&pipeline)?;
//!     Ok(())
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     pipebench::run()
//! }
//! ```
//!
//! ## Sub-benchmarks
//!
//! ```ignore
//! #[benchmark]
//! fn openml(b: &mut Benchmark) -> anyhow::Result<()> {
//!     for dataset in ["mnist", "chicago_taxi"] {
//!         let mut sub = b.sub_benchmark(dataset);
//!         sub.evaluate_pipeline(&build_pipeline(dataset)?)?;
//!     }
//!     Ok(())
//! }
//! ```

// Re-export core types
pub use pipebench_core::{
    AggregateEntry, AggregateError, AggregatePipeline, Benchmark, BenchmarkDef, BenchmarkError,
    BenchmarkFn, BenchmarkInstance, BenchmarkResult, Channel, Component, EVALUATOR_KIND,
    GraphError, InstanceState, NamedPipeline, PipelineSource, ROOT_BENCHMARK, Registry,
    RegistryError, SubBenchmark, naming, registry,
};

// Re-export macros
pub use pipebench_macros::{abstract_benchmark, benchmark};

// Re-export orchestration
pub use pipebench_cli::{
    Cli, ClusterConfig, ClusterOrchestrator, ComponentExecutor, ConfigError, ExecutionTarget,
    LocalConfig, LocalOrchestrator, LoggingExecutor, NameFilter, Orchestrator, PipelineArgs,
    RunOptions, RunSummary, RuntimeConfig, ValidatedConfig, execution_order, orchestrator_for,
    run_with_cli, runner,
};

// Re-export reports
pub use pipebench_report::{OutputFormat, PipelinePackage, RunReport};

/// Internal re-exports for macro use
#[doc(hidden)]
pub mod internal {
    pub use anyhow;
    pub use inventory;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Benchmark, Channel, Component, PipelineSource, SubBenchmark, abstract_benchmark,
        benchmark,
    };
}

/// Run the Pipebench CLI harness.
///
/// Call this from your benchmark binary's `main()`:
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     pipebench::run()
/// }
/// ```
pub use pipebench_cli::run;
