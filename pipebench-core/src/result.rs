//! Benchmark Results
//!
//! Named pipelines produced by one run of a benchmark instance.

use crate::pipeline::{Channel, Component};

/// A pipeline submitted through `evaluate()`, tagged with its qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedPipeline {
    /// Fully-qualified dotted benchmark name
    pub name: String,
    /// Component handles, ending with the appended evaluator
    pub components: Vec<Component>,
    /// Examples channel the evaluation reads
    pub examples: Channel,
    /// Model channel the evaluation reads
    pub model: Channel,
}

/// Ordered named pipelines, in `evaluate()` call order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BenchmarkResult {
    pipelines: Vec<NamedPipeline>,
}

impl BenchmarkResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, pipeline: NamedPipeline) {
        self.pipelines.push(pipeline);
    }

    /// Pipelines in call order
    pub fn pipelines(&self) -> &[NamedPipeline] {
        &self.pipelines
    }

    /// Names in call order
    pub fn names(&self) -> Vec<&str> {
        self.pipelines.iter().map(|p| p.name.as_str()).collect()
    }

    /// Names sorted lexicographically, for display and comparison
    pub fn sorted_names(&self) -> Vec<&str> {
        let mut names = self.names();
        names.sort_unstable();
        names
    }

    /// Number of named pipelines
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    /// Whether nothing was evaluated
    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    /// Append another result, keeping order.
    pub fn extend(&mut self, other: BenchmarkResult) {
        self.pipelines.extend(other.pipelines);
    }
}

impl IntoIterator for BenchmarkResult {
    type Item = NamedPipeline;
    type IntoIter = std::vec::IntoIter<NamedPipeline>;

    fn into_iter(self) -> Self::IntoIter {
        self.pipelines.into_iter()
    }
}

impl FromIterator<NamedPipeline> for BenchmarkResult {
    fn from_iter<I: IntoIterator<Item = NamedPipeline>>(iter: I) -> Self {
        Self {
            pipelines: iter.into_iter().collect(),
        }
    }
}
