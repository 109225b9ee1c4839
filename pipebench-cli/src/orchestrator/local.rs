//! Local Orchestrator
//!
//! Orders the aggregate's components so every producer precedes its
//! consumers, then hands them one by one to a [`ComponentExecutor`].

use super::Orchestrator;
use crate::config::{ExecutionTarget, ValidatedConfig};
use fxhash::FxHashMap;
use indicatif::{ProgressBar, ProgressStyle};
use pipebench_core::{AggregatePipeline, Component, GraphError, HierarchyGraph};

/// Executes a single component
pub trait ComponentExecutor {
    /// Run one component; all of its producers have already run
    fn execute(&self, component: &Component) -> anyhow::Result<()>;
}

/// Executor that only logs each step
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingExecutor;

impl ComponentExecutor for LoggingExecutor {
    fn execute(&self, component: &Component) -> anyhow::Result<()> {
        tracing::info!(component = %component.id, kind = %component.kind, "executing component");
        Ok(())
    }
}

/// In-process orchestrator
#[derive(Debug, Default)]
pub struct LocalOrchestrator<E = LoggingExecutor> {
    executor: E,
}

impl LocalOrchestrator {
    /// Orchestrator with the logging executor
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: ComponentExecutor> LocalOrchestrator<E> {
    /// Orchestrator with a custom executor
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    /// The executor components are handed to
    pub fn executor(&self) -> &E {
        &self.executor
    }
}

/// Components in dependency order.
///
/// Fails if a component reads from a producer outside the aggregate or the
/// channels form a cycle.
pub fn execution_order(aggregate: &AggregatePipeline) -> Result<Vec<&Component>, GraphError> {
    let by_id: FxHashMap<&str, &Component> = aggregate
        .components()
        .iter()
        .map(|c| (c.id.as_str(), c))
        .collect();

    let mut graph = HierarchyGraph::new();
    for component in aggregate.components() {
        graph.add_node(component.id.as_str());
        for producer in component.upstream() {
            if !by_id.contains_key(producer) {
                return Err(GraphError::UnknownProducer {
                    consumer: component.id.clone(),
                    producer: producer.to_string(),
                });
            }
            graph.add_edge(producer, component.id.as_str());
        }
    }

    Ok(graph
        .topological_sort()?
        .iter()
        .filter_map(|id| by_id.get(id.as_str()).copied())
        .collect())
}

impl<E: ComponentExecutor> Orchestrator for LocalOrchestrator<E> {
    fn name(&self) -> &'static str {
        "local"
    }

    fn run(&self, aggregate: &AggregatePipeline, config: &ValidatedConfig) -> anyhow::Result<()> {
        let order = execution_order(aggregate)?;
        let show_progress = match &config.target {
            ExecutionTarget::Local(local) => local.show_progress,
            ExecutionTarget::Cluster(_) => false,
        };

        tracing::info!(
            pipeline = config.pipeline_name(),
            benchmarks = aggregate.entries().len(),
            components = order.len(),
            "running aggregate pipeline locally"
        );

        let pb = if show_progress {
            let pb = ProgressBar::new(order.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        for component in order {
            pb.set_message(component.id.clone());
            if let Err(err) = self.executor.execute(component) {
                pb.abandon_with_message(format!("Failed at {}", component.id));
                return Err(err.context(format!("component `{}` failed", component.id)));
            }
            pb.inc(1);
        }

        pb.finish_with_message("Complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use pipebench_core::{Channel, NamedPipeline};
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl ComponentExecutor for Recorder {
        fn execute(&self, component: &Component) -> anyhow::Result<()> {
            if self.fail_on == Some(component.kind.as_str()) {
                anyhow::bail!("{} crashed", component.kind);
            }
            self.seen.borrow_mut().push(component.id.clone());
            Ok(())
        }
    }

    fn aggregate(components: Vec<Component>) -> AggregatePipeline {
        let examples = Channel::new("ImportExampleGen", "examples", "Examples");
        let model = Channel::new("Trainer", "model", "Model");
        AggregatePipeline::concatenate(vec![NamedPipeline {
            name: "A.benchmark".to_string(),
            components,
            examples,
            model,
        }])
        .unwrap()
    }

    fn tabular() -> Vec<Component> {
        let example_gen = Component::new("ImportExampleGen").output("examples", "Examples");
        let examples = example_gen.channel("examples").unwrap();
        let stats = Component::new("StatisticsGen")
            .input("examples", &examples)
            .output("statistics", "ExampleStatistics");
        let statistics = stats.channel("statistics").unwrap();
        let schema = Component::new("SchemaGen")
            .input("statistics", &statistics)
            .output("schema", "Schema");
        let trainer = Component::new("Trainer")
            .input("examples", &examples)
            .input("schema", &schema.channel("schema").unwrap())
            .output("model", "Model");
        // Deliberately listed consumers-first
        vec![trainer, schema, stats, example_gen]
    }

    fn local_config(show_progress: bool) -> ValidatedConfig {
        let mut config = RuntimeConfig::local();
        if let Some(local) = config.local_config.as_mut() {
            local.show_progress = show_progress;
        }
        config.validate(1).unwrap()
    }

    #[test]
    fn test_execution_order_respects_channels() {
        let aggregate = aggregate(tabular());
        let order: Vec<_> = execution_order(&aggregate)
            .unwrap()
            .iter()
            .map(|c| c.kind.as_str())
            .collect();

        let pos = |kind: &str| order.iter().position(|k| *k == kind).unwrap();
        assert_eq!(order.len(), 4);
        assert!(pos("ImportExampleGen") < pos("StatisticsGen"));
        assert!(pos("StatisticsGen") < pos("SchemaGen"));
        assert!(pos("SchemaGen") < pos("Trainer"));
    }

    #[test]
    fn test_unknown_producer() {
        let dangling = Channel::new("Elsewhere", "examples", "Examples");
        let aggregate = aggregate(vec![Component::new("Trainer").input("examples", &dangling)]);
        assert_eq!(
            execution_order(&aggregate).unwrap_err(),
            GraphError::UnknownProducer {
                consumer: "A.benchmark.Trainer".to_string(),
                producer: "Elsewhere".to_string(),
            }
        );
    }

    #[test]
    fn test_cycle_detected() {
        let a = Component::new("A").output("out", "X");
        let b = Component::new("B")
            .input("in", &a.channel("out").unwrap())
            .output("out", "X");
        let a = a.input("in", &b.channel("out").unwrap());
        let aggregate = aggregate(vec![a, b]);
        assert!(matches!(
            execution_order(&aggregate),
            Err(GraphError::CycleDetected(_))
        ));
    }

    #[test]
    fn test_run_executes_every_component() {
        let orchestrator = LocalOrchestrator::with_executor(Recorder::default());
        orchestrator
            .run(&aggregate(tabular()), &local_config(false))
            .unwrap();

        let seen = orchestrator.executor().seen.borrow();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], "A.benchmark.ImportExampleGen");
        assert_eq!(seen[3], "A.benchmark.Trainer");
    }

    #[test]
    fn test_run_stops_at_failure() {
        let orchestrator = LocalOrchestrator::with_executor(Recorder {
            fail_on: Some("SchemaGen"),
            ..Recorder::default()
        });
        let err = orchestrator
            .run(&aggregate(tabular()), &local_config(true))
            .unwrap_err();

        assert!(err.to_string().contains("A.benchmark.SchemaGen"));
        assert!(!orchestrator
            .executor()
            .seen
            .borrow()
            .contains(&"A.benchmark.Trainer".to_string()));
    }
}
