#![warn(missing_docs)]
//! Pipebench Core - Benchmark Runtime
//!
//! This crate provides everything a benchmark body touches:
//! - `Benchmark` context with scoped sub-benchmarks and single-evaluation tracking
//! - Dotted name construction for benchmark runs and replicas
//! - `BenchmarkDef` registration records collected at link time
//! - A definition registry with transitive `extends` discovery
//! - Concatenation of named pipelines into one `AggregatePipeline`

mod aggregate;
mod context;
mod error;
mod hierarchy;
mod instance;
pub mod naming;
mod pipeline;
pub mod registry;
mod result;

pub use aggregate::{AggregateEntry, AggregatePipeline};
pub use context::{Benchmark, SubBenchmark};
pub use error::{AggregateError, BenchmarkError, RegistryError};
pub use hierarchy::{GraphError, HierarchyGraph};
pub use instance::{BenchmarkInstance, InstanceState};
pub use pipeline::{Channel, Component, EVALUATOR_KIND, PipelineSource};
pub use registry::{ROOT_BENCHMARK, Registry};
pub use result::{BenchmarkResult, NamedPipeline};

/// Entry point of a concrete benchmark definition
pub type BenchmarkFn = fn(&mut Benchmark) -> anyhow::Result<()>;

/// Benchmark definition registered via `#[pipebench::benchmark]`
///
/// Identity is the `name`: two records with the same name are the same
/// definition as far as the registry and hashing are concerned.
#[derive(Debug, Clone, Copy)]
pub struct BenchmarkDef {
    /// Definition (class) name; may itself be dotted
    pub name: &'static str,
    /// Entry-point name appended after the class name
    pub method: &'static str,
    /// Definition this one extends (`None` = the root `Benchmark`)
    pub parent: Option<&'static str>,
    /// Entry point; `None` marks an abstract definition
    pub runner_fn: Option<BenchmarkFn>,
    /// Tags for filtering
    pub tags: &'static [&'static str],
    /// Human-readable description
    pub description: &'static str,
    /// Source file path
    pub file: &'static str,
    /// Source line number
    pub line: u32,
    /// Module path
    pub module_path: &'static str,
}

impl BenchmarkDef {
    /// Concrete definition with the default `benchmark` entry point
    pub const fn new(name: &'static str, runner_fn: BenchmarkFn) -> Self {
        Self {
            name,
            method: "benchmark",
            parent: None,
            runner_fn: Some(runner_fn),
            tags: &[],
            description: "",
            file: "",
            line: 0,
            module_path: "",
        }
    }

    /// Abstract definition that others can extend
    pub const fn abstract_def(name: &'static str) -> Self {
        Self {
            name,
            method: "benchmark",
            parent: None,
            runner_fn: None,
            tags: &[],
            description: "",
            file: "",
            line: 0,
            module_path: "",
        }
    }

    /// Set the definition this one extends
    pub const fn extends(self, parent: &'static str) -> Self {
        Self {
            parent: Some(parent),
            ..self
        }
    }

    /// Set the entry-point name
    pub const fn method(self, method: &'static str) -> Self {
        Self { method, ..self }
    }

    /// Set filter tags
    pub const fn tags(self, tags: &'static [&'static str]) -> Self {
        Self { tags, ..self }
    }

    /// Whether this definition has no entry point
    pub const fn is_abstract(&self) -> bool {
        self.runner_fn.is_none()
    }

    /// Parent name, resolving `None` to the root
    pub fn parent_name(&self) -> &'static str {
        self.parent.unwrap_or(ROOT_BENCHMARK)
    }

    /// `<name>.<method>`, the prefix of every pipeline name this definition produces
    pub fn base_name(&self) -> String {
        naming::qualify(self.name, self.method)
    }
}

impl PartialEq for BenchmarkDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for BenchmarkDef {}

impl std::hash::Hash for BenchmarkDef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

// Collect all registered benchmark definitions
inventory::collect!(BenchmarkDef);

/// Anchor to prevent LTO from stripping inventory entries
#[used]
#[doc(hidden)]
pub static REGISTRY_ANCHOR: fn() = || {
    for _ in inventory::iter::<BenchmarkDef> {}
};
