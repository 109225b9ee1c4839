//! Benchmark Instances
//!
//! One instantiation of a definition, optionally labeled to tell replicas
//! apart. An instance runs its entry point exactly once.

use crate::context::Benchmark;
use crate::error::BenchmarkError;
use crate::naming::qualify_opt;
use crate::result::BenchmarkResult;
use crate::{BenchmarkDef, BenchmarkFn};

/// Lifecycle of a benchmark instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceState {
    /// Constructed, not yet run
    Created,
    /// Entry point executing
    Running,
    /// Entry point returned normally
    Completed,
    /// Entry point returned an error
    Failed,
}

/// A runnable instantiation of a [`BenchmarkDef`].
#[derive(Debug, Clone)]
pub struct BenchmarkInstance {
    def: &'static BenchmarkDef,
    runner_fn: BenchmarkFn,
    label: Option<String>,
    state: InstanceState,
}

impl BenchmarkInstance {
    /// Instantiate a definition.
    ///
    /// Fails with [`BenchmarkError::AbstractDefinition`] when the definition
    /// has no entry point.
    pub fn new(def: &'static BenchmarkDef) -> Result<Self, BenchmarkError> {
        let runner_fn = def
            .runner_fn
            .ok_or_else(|| BenchmarkError::AbstractDefinition(def.name.to_string()))?;
        Ok(Self {
            def,
            runner_fn,
            label: None,
            state: InstanceState::Created,
        })
    }

    /// Append `label` to this instance's label
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(qualify_opt(self.label.as_deref(), label));
        self
    }

    /// Definition this instance was built from
    pub fn def(&self) -> &'static BenchmarkDef {
        self.def
    }

    /// Instance label, if any
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Current lifecycle state
    pub fn state(&self) -> InstanceState {
        self.state
    }

    /// Display name: the definition's base name plus the label
    pub fn name(&self) -> String {
        match &self.label {
            Some(label) => crate::naming::qualify(&self.def.base_name(), label),
            None => self.def.base_name(),
        }
    }

    /// Copy of this instance reset to `Created`.
    pub(crate) fn fresh(&self) -> Self {
        Self {
            def: self.def,
            runner_fn: self.runner_fn,
            label: self.label.clone(),
            state: InstanceState::Created,
        }
    }

    /// Expand into `n` independently named replicas.
    ///
    /// `n <= 1` returns the instance unchanged; otherwise each replica gets a
    /// `run_k_of_n` label.
    pub fn replicate(self, n: u32) -> Vec<BenchmarkInstance> {
        if n <= 1 {
            return vec![self];
        }
        (1..=n)
            .map(|k| self.fresh().with_label(&crate::naming::replica_label(k, n)))
            .collect()
    }

    /// Run the entry point and collect its named pipelines.
    ///
    /// Any error from the body, or a duplicate evaluation the body ignored,
    /// fails the instance and nothing it produced is returned.
    pub fn run(&mut self) -> anyhow::Result<BenchmarkResult> {
        if self.state != InstanceState::Created {
            return Err(BenchmarkError::AlreadyRun(self.name()).into());
        }

        self.state = InstanceState::Running;
        tracing::info!(benchmark = %self.name(), "running benchmark");

        let mut bench = Benchmark::new(self.def.base_name(), self.label.clone());
        let outcome = (self.runner_fn)(&mut bench)
            .and_then(|()| bench.finish().map_err(anyhow::Error::from));

        match outcome {
            Ok(result) => {
                self.state = InstanceState::Completed;
                tracing::debug!(benchmark = %self.name(), pipelines = result.len(), "benchmark completed");
                Ok(result)
            }
            Err(err) => {
                self.state = InstanceState::Failed;
                tracing::debug!(benchmark = %self.name(), error = %err, "benchmark failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Channel;

    fn evaluate_once(b: &mut Benchmark) -> anyhow::Result<()> {
        let examples = Channel::new("gen", "examples", "Examples");
        let model = Channel::new("trainer", "model", "Model");
        b.evaluate(Vec::new(), examples, model)?;
        Ok(())
    }

    fn evaluate_twice(b: &mut Benchmark) -> anyhow::Result<()> {
        evaluate_once(b)?;
        evaluate_once(b)
    }

    fn ignore_duplicate(b: &mut Benchmark) -> anyhow::Result<()> {
        evaluate_once(b)?;
        let _ = evaluate_once(b);
        Ok(())
    }

    fn fail(_: &mut Benchmark) -> anyhow::Result<()> {
        anyhow::bail!("schema inference failed")
    }

    static ONCE: BenchmarkDef = BenchmarkDef::new("Suite.Once", evaluate_once);
    static TWICE: BenchmarkDef = BenchmarkDef::new("Suite.Twice", evaluate_twice);
    static IGNORED: BenchmarkDef = BenchmarkDef::new("Suite.Ignored", ignore_duplicate);
    static FAILING: BenchmarkDef = BenchmarkDef::new("Suite.Failing", fail);
    static ABSTRACT: BenchmarkDef = BenchmarkDef::abstract_def("Suite.Abstract");

    #[test]
    fn test_run_completes() {
        let mut instance = BenchmarkInstance::new(&ONCE).unwrap();
        assert_eq!(instance.state(), InstanceState::Created);

        let result = instance.run().unwrap();
        assert_eq!(result.names(), vec!["Suite.Once.benchmark"]);
        assert_eq!(instance.state(), InstanceState::Completed);
    }

    #[test]
    fn test_run_twice_rejected() {
        let mut instance = BenchmarkInstance::new(&ONCE).unwrap();
        instance.run().unwrap();
        let err = instance.run().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BenchmarkError>(),
            Some(BenchmarkError::AlreadyRun(_))
        ));
    }

    #[test]
    fn test_duplicate_evaluation_fails_instance() {
        let mut instance = BenchmarkInstance::new(&TWICE).unwrap();
        let err = instance.run().unwrap_err();
        assert_eq!(
            err.downcast_ref::<BenchmarkError>(),
            Some(&BenchmarkError::DuplicateEvaluation(
                "Suite.Twice.benchmark".to_string()
            ))
        );
        assert_eq!(instance.state(), InstanceState::Failed);
    }

    #[test]
    fn test_ignored_duplicate_still_fails() {
        let mut instance = BenchmarkInstance::new(&IGNORED).unwrap();
        assert!(instance.run().is_err());
        assert_eq!(instance.state(), InstanceState::Failed);
    }

    #[test]
    fn test_body_error_propagates() {
        let mut instance = BenchmarkInstance::new(&FAILING).unwrap();
        let err = instance.run().unwrap_err();
        assert_eq!(err.to_string(), "schema inference failed");
    }

    #[test]
    fn test_abstract_definition_not_instantiable() {
        let err = BenchmarkInstance::new(&ABSTRACT).unwrap_err();
        assert_eq!(
            err,
            BenchmarkError::AbstractDefinition("Suite.Abstract".to_string())
        );
    }

    #[test]
    fn test_replicate() {
        let single = BenchmarkInstance::new(&ONCE).unwrap().replicate(1);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].label(), None);

        let names: Vec<_> = BenchmarkInstance::new(&ONCE)
            .unwrap()
            .replicate(3)
            .iter_mut()
            .map(|r| r.run().unwrap().names()[0].to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "Suite.Once.benchmark.run_1_of_3",
                "Suite.Once.benchmark.run_2_of_3",
                "Suite.Once.benchmark.run_3_of_3",
            ]
        );
    }

    #[test]
    fn test_replicate_keeps_existing_label() {
        let replicas = BenchmarkInstance::new(&ONCE)
            .unwrap()
            .with_label("warm")
            .replicate(2);
        assert_eq!(replicas[1].label(), Some("warm.run_2_of_2"));
    }
}
