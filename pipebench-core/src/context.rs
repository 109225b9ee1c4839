//! Benchmark Context
//!
//! The handle passed to every benchmark body. It tracks the active stack of
//! sub-benchmark scopes and the names already evaluated, so that each
//! fully-qualified name is produced at most once per instance.
//!
//! ```ignore
//! #[pipebench::benchmark]
//! fn my_benchmark(b: &mut Benchmark) -> anyhow::Result<()> {
//!     let pipeline = build_pipeline();
//!     {
//!         let mut mnist = b.sub_benchmark("mnist");
//!         mnist.evaluate_pipeline(&pipeline)?;   // MyBenchmark.benchmark.mnist
//!     }
//!     b.evaluate_pipeline(&pipeline)?;           // MyBenchmark.benchmark
//!     Ok(())
//! }
//! ```

use crate::error::BenchmarkError;
use crate::naming::qualify;
use crate::pipeline::{Channel, Component, PipelineSource};
use crate::result::{BenchmarkResult, NamedPipeline};
use fxhash::FxHashSet;
use std::ops::{Deref, DerefMut};

#[derive(Debug)]
struct ScopeFrame {
    label: String,
    /// Pipelines evaluated in this scope or any scope nested in it
    produced: usize,
}

/// Scope and name bookkeeping for a single run of a benchmark instance.
#[derive(Debug)]
pub struct Benchmark {
    base_name: String,
    instance_label: Option<String>,
    scopes: Vec<ScopeFrame>,
    evaluated: FxHashSet<String>,
    result: BenchmarkResult,
    failure: Option<BenchmarkError>,
}

impl Benchmark {
    /// Create a context whose names start with `base_name` (`Class.method`).
    ///
    /// `instance_label` is appended after every scope label, e.g. `run_1_of_3`.
    pub fn new(base_name: impl Into<String>, instance_label: Option<String>) -> Self {
        Self {
            base_name: base_name.into(),
            instance_label,
            scopes: Vec::new(),
            evaluated: FxHashSet::default(),
            result: BenchmarkResult::new(),
            failure: None,
        }
    }

    /// Name that `evaluate()` would record right now
    pub fn current_name(&self) -> String {
        let scoped = self
            .scopes
            .iter()
            .fold(self.base_name.clone(), |name, frame| qualify(&name, &frame.label));
        match &self.instance_label {
            Some(label) => qualify(&scoped, label),
            None => scoped,
        }
    }

    /// Active sub-benchmark labels, outermost first
    pub fn scope_path(&self) -> Vec<&str> {
        self.scopes.iter().map(|f| f.label.as_str()).collect()
    }

    /// Enter a named sub-benchmark.
    ///
    /// The label stays on the scope stack until the returned guard is
    /// dropped, including on early return or panic. Reusing a sibling label
    /// is allowed; a clash is only reported if it leads to a duplicate name
    /// being evaluated.
    pub fn sub_benchmark(&mut self, label: impl Into<String>) -> SubBenchmark<'_> {
        let label = label.into();
        tracing::debug!(benchmark = %self.base_name, %label, "entering sub-benchmark");
        self.scopes.push(ScopeFrame { label, produced: 0 });
        SubBenchmark { bench: self }
    }

    /// Run `f` inside the named sub-benchmark.
    pub fn with_sub_benchmark<T, E>(
        &mut self,
        label: impl Into<String>,
        f: impl FnOnce(&mut Benchmark) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut scope = self.sub_benchmark(label);
        f(&mut *scope)
    }

    /// Record the pipeline for the current scope.
    ///
    /// An `Evaluator` reading `examples` and `model` is appended to the
    /// components. Fails with [`BenchmarkError::DuplicateEvaluation`] if the
    /// current name was already evaluated; that failure is also latched so the
    /// run fails even if the caller drops the error.
    pub fn evaluate(
        &mut self,
        components: Vec<Component>,
        examples: Channel,
        model: Channel,
    ) -> Result<(), BenchmarkError> {
        let name = self.current_name();
        if !self.evaluated.insert(name.clone()) {
            let err = BenchmarkError::DuplicateEvaluation(name);
            self.failure.get_or_insert_with(|| err.clone());
            return Err(err);
        }

        let mut components = components;
        components.push(Component::evaluator(&examples, &model));
        tracing::debug!(%name, components = components.len(), "evaluated");

        self.result.push(NamedPipeline {
            name,
            components,
            examples,
            model,
        });
        if let Some(frame) = self.scopes.last_mut() {
            frame.produced += 1;
        }
        Ok(())
    }

    /// [`Benchmark::evaluate`] for anything implementing [`PipelineSource`].
    pub fn evaluate_pipeline(&mut self, source: &dyn PipelineSource) -> Result<(), BenchmarkError> {
        self.evaluate(source.components(), source.examples(), source.model())
    }

    /// Pipelines evaluated so far
    pub fn result(&self) -> &BenchmarkResult {
        &self.result
    }

    /// Consume the context.
    ///
    /// Returns the latched duplicate-evaluation error if one occurred.
    pub fn finish(self) -> Result<BenchmarkResult, BenchmarkError> {
        if let Some(err) = self.failure {
            return Err(err);
        }
        if self.result.is_empty() {
            tracing::warn!(benchmark = %self.base_name, "benchmark completed without calling evaluate()");
        }
        Ok(self.result)
    }

    fn exit_scope(&mut self) {
        let Some(frame) = self.scopes.pop() else {
            return;
        };
        tracing::debug!(benchmark = %self.base_name, label = %frame.label, "leaving sub-benchmark");
        if frame.produced == 0 {
            tracing::warn!(
                benchmark = %self.base_name,
                label = %frame.label,
                "sub-benchmark exited without calling evaluate()"
            );
        }
        if let Some(parent) = self.scopes.last_mut() {
            parent.produced += frame.produced;
        }
    }
}

/// Guard for an active sub-benchmark scope.
///
/// Derefs to [`Benchmark`], so `evaluate()` and nested `sub_benchmark()`
/// calls go through it. Dropping it pops the scope.
#[must_use = "the sub-benchmark scope ends as soon as the guard is dropped"]
pub struct SubBenchmark<'a> {
    bench: &'a mut Benchmark,
}

impl Deref for SubBenchmark<'_> {
    type Target = Benchmark;

    fn deref(&self) -> &Benchmark {
        self.bench
    }
}

impl DerefMut for SubBenchmark<'_> {
    fn deref_mut(&mut self) -> &mut Benchmark {
        self.bench
    }
}

impl Drop for SubBenchmark<'_> {
    fn drop(&mut self) {
        self.bench.exit_scope();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakePipeline;

    impl PipelineSource for FakePipeline {
        fn components(&self) -> Vec<Component> {
            Vec::new()
        }
        fn examples(&self) -> Channel {
            Channel::new("ExampleGen", "examples", "Examples")
        }
        fn model(&self) -> Channel {
            Channel::new("Trainer", "model", "Model")
        }
    }

    fn names(bench: Benchmark) -> Vec<String> {
        let result = bench.finish().unwrap();
        result.sorted_names().into_iter().map(String::from).collect()
    }

    #[test]
    fn test_top_level_evaluate() {
        let mut b = Benchmark::new("Suite.benchmark", None);
        b.evaluate_pipeline(&FakePipeline).unwrap();
        assert_eq!(names(b), vec!["Suite.benchmark"]);
    }

    #[test]
    fn test_evaluate_appends_evaluator() {
        let mut b = Benchmark::new("Suite.benchmark", None);
        b.evaluate_pipeline(&FakePipeline).unwrap();
        let components = &b.result().pipelines()[0].components;
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].kind, crate::pipeline::EVALUATOR_KIND);
    }

    #[test]
    fn test_sub_benchmark() {
        let mut b = Benchmark::new("Suite.benchmark", None);
        {
            let mut one = b.sub_benchmark("one");
            assert_eq!(one.scope_path(), vec!["one"]);
            one.evaluate_pipeline(&FakePipeline).unwrap();
        }
        assert!(b.scope_path().is_empty());
        assert_eq!(names(b), vec!["Suite.benchmark.one"]);
    }

    #[test]
    fn test_benchmark_and_sub_benchmark() {
        let mut b = Benchmark::new("Suite.benchmark", None);
        b.evaluate_pipeline(&FakePipeline).unwrap();
        b.with_sub_benchmark("one", |b| b.evaluate_pipeline(&FakePipeline))
            .unwrap();
        assert_eq!(names(b), vec!["Suite.benchmark", "Suite.benchmark.one"]);
    }

    #[test]
    fn test_nested_sub_benchmarks() {
        let mut b = Benchmark::new("Suite.benchmark", None);
        {
            let mut one = b.sub_benchmark("one");
            let mut two = one.sub_benchmark("two");
            assert_eq!(two.current_name(), "Suite.benchmark.one.two");
            two.evaluate_pipeline(&FakePipeline).unwrap();
        }
        assert_eq!(names(b), vec!["Suite.benchmark.one.two"]);
    }

    #[test]
    fn test_multiple_sub_benchmarks_sorted() {
        let mut b = Benchmark::new("Suite.benchmark", None);
        b.with_sub_benchmark("mnist", |b| b.evaluate_pipeline(&FakePipeline))
            .unwrap();
        b.with_sub_benchmark("chicago_taxi", |b| b.evaluate_pipeline(&FakePipeline))
            .unwrap();

        assert_eq!(
            b.result().names(),
            vec!["Suite.benchmark.mnist", "Suite.benchmark.chicago_taxi"]
        );
        assert_eq!(
            names(b),
            vec!["Suite.benchmark.chicago_taxi", "Suite.benchmark.mnist"]
        );
    }

    #[test]
    fn test_instance_label_is_last_segment() {
        let mut b = Benchmark::new("Suite.benchmark", Some("run_2_of_3".to_string()));
        b.with_sub_benchmark("one", |b| b.evaluate_pipeline(&FakePipeline))
            .unwrap();
        assert_eq!(names(b), vec!["Suite.benchmark.one.run_2_of_3"]);
    }

    #[test]
    fn test_evaluate_twice_fails() {
        let mut b = Benchmark::new("Suite.benchmark", None);
        b.evaluate_pipeline(&FakePipeline).unwrap();
        let err = b.evaluate_pipeline(&FakePipeline).unwrap_err();
        assert_eq!(
            err,
            BenchmarkError::DuplicateEvaluation("Suite.benchmark".to_string())
        );
    }

    #[test]
    fn test_evaluate_twice_in_sub_benchmark_fails() {
        let mut b = Benchmark::new("Suite.benchmark", None);
        let mut one = b.sub_benchmark("one");
        one.evaluate_pipeline(&FakePipeline).unwrap();
        assert!(matches!(
            one.evaluate_pipeline(&FakePipeline),
            Err(BenchmarkError::DuplicateEvaluation(name)) if name == "Suite.benchmark.one"
        ));
    }

    #[test]
    fn test_reused_label_collides_only_on_evaluate() {
        let mut b = Benchmark::new("Suite.benchmark", None);
        // Entering "one" without evaluating leaves the name free.
        drop(b.sub_benchmark("one"));
        b.with_sub_benchmark("one", |b| b.evaluate_pipeline(&FakePipeline))
            .unwrap();
        let second = b.with_sub_benchmark("one", |b| b.evaluate_pipeline(&FakePipeline));
        assert!(second.is_err());
    }

    #[test]
    fn test_swallowed_duplicate_still_fails() {
        let mut b = Benchmark::new("Suite.benchmark", None);
        b.evaluate_pipeline(&FakePipeline).unwrap();
        let _ = b.evaluate_pipeline(&FakePipeline);
        assert!(matches!(
            b.finish(),
            Err(BenchmarkError::DuplicateEvaluation(_))
        ));
    }

    #[test]
    fn test_scope_popped_on_error() {
        let mut b = Benchmark::new("Suite.benchmark", None);
        let result: Result<(), &str> = b.with_sub_benchmark("one", |_| Err("boom"));
        assert!(result.is_err());
        assert!(b.scope_path().is_empty());
        assert_eq!(b.current_name(), "Suite.benchmark");
    }
}
