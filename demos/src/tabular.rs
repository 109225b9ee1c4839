//! Tabular Pipeline
//!
//! Statistics, schema inference, transform and training on top of a
//! [`CatalogDataset`].

use crate::catalog::CatalogDataset;
use pipebench::{Channel, Component, PipelineSource};

const TRAINER_ID: &str = "Trainer";

/// Standard tabular pipeline
#[derive(Debug, Clone)]
pub struct TabularPipeline {
    components: Vec<Component>,
    examples: Channel,
    model: Channel,
    train_steps: u64,
    eval_steps: u64,
}

impl TabularPipeline {
    /// Build the pipeline for `dataset`
    pub fn new(dataset: &CatalogDataset) -> Self {
        let examples = dataset.examples();

        let statistics_gen = Component::new("StatisticsGen")
            .input("examples", &examples)
            .output("statistics", "ExampleStatistics");
        let statistics = Channel::new(&statistics_gen.id, "statistics", "ExampleStatistics");

        let schema_gen = Component::new("SchemaGen")
            .input("statistics", &statistics)
            .output("schema", "Schema");
        let schema = Channel::new(&schema_gen.id, "schema", "Schema");

        let transform = Component::new("Transform")
            .input("examples", &examples)
            .input("schema", &schema)
            .output("transformed_examples", "Examples")
            .output("transform_graph", "TransformGraph");
        let transformed = Channel::new(&transform.id, "transformed_examples", "Examples");
        let transform_graph = Channel::new(&transform.id, "transform_graph", "TransformGraph");

        let trainer = Component::new(TRAINER_ID)
            .input("transformed_examples", &transformed)
            .input("schema", &schema)
            .input("transform_graph", &transform_graph)
            .output("model", "Model");
        let model = Channel::new(&trainer.id, "model", "Model");

        let mut components = dataset.components();
        components.extend([statistics_gen, schema_gen, transform, trainer]);

        Self {
            components,
            examples,
            model,
            train_steps: 0,
            eval_steps: 0,
        }
        .with_steps(10_000, 5_000)
    }

    /// Set the number of training and evaluation steps the trainer runs
    pub fn with_steps(mut self, train_steps: u64, eval_steps: u64) -> Self {
        self.train_steps = train_steps;
        self.eval_steps = eval_steps;
        if let Some(trainer) = self.components.iter_mut().find(|c| c.id == TRAINER_ID) {
            trainer
                .parameters
                .insert("train_steps".to_string(), train_steps.to_string());
            trainer
                .parameters
                .insert("eval_steps".to_string(), eval_steps.to_string());
        }
        self
    }

    /// Training steps
    pub fn train_steps(&self) -> u64 {
        self.train_steps
    }

    /// Evaluation steps
    pub fn eval_steps(&self) -> u64 {
        self.eval_steps
    }
}

impl PipelineSource for TabularPipeline {
    fn components(&self) -> Vec<Component> {
        self.components.clone()
    }

    fn examples(&self) -> Channel {
        self.examples.clone()
    }

    fn model(&self) -> Channel {
        self.model.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DatasetInfo, SplitInfo};
    use pipebench::{AggregatePipeline, Benchmark, EVALUATOR_KIND, execution_order};
    use std::collections::BTreeMap;

    fn dataset() -> CatalogDataset {
        CatalogDataset::from_info(DatasetInfo {
            name: "titanic".to_string(),
            description: String::new(),
            data_dir: "/data/titanic".to_string(),
            splits: BTreeMap::from([(
                "train".to_string(),
                SplitInfo {
                    filenames: vec!["titanic-train.tfrecord".to_string()],
                },
            )]),
            supervised_keys: None,
        })
        .unwrap()
    }

    #[test]
    fn test_components() {
        let pipeline = TabularPipeline::new(&dataset());
        let kinds: Vec<_> = pipeline
            .components()
            .into_iter()
            .map(|c| c.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                "ImportExampleGen",
                "StatisticsGen",
                "SchemaGen",
                "Transform",
                "Trainer"
            ]
        );
        assert_eq!(pipeline.examples().producer, "ImportExampleGen");
        assert_eq!(pipeline.model().producer, "Trainer");
        assert_eq!(pipeline.train_steps(), 10_000);
        assert_eq!(pipeline.with_steps(10, 5).eval_steps(), 5);
    }

    fn trainer(pipeline: &TabularPipeline) -> Component {
        pipeline
            .components()
            .into_iter()
            .find(|c| c.kind == "Trainer")
            .unwrap()
    }

    #[test]
    fn test_steps_reach_trainer() {
        let pipeline = TabularPipeline::new(&dataset());
        assert_eq!(trainer(&pipeline).parameters["train_steps"], "10000");
        assert_eq!(trainer(&pipeline).parameters["eval_steps"], "5000");

        let short = pipeline.with_steps(10, 5);
        assert_eq!(trainer(&short).parameters["train_steps"], "10");
        assert_eq!(trainer(&short).parameters["eval_steps"], "5");
    }

    #[test]
    fn test_evaluated_pipeline_is_ordered() {
        let mut bench = Benchmark::new("TitanicBenchmark.benchmark", None);
        bench
            .evaluate_pipeline(&TabularPipeline::new(&dataset()))
            .unwrap();
        let result = bench.finish().unwrap();

        let aggregate = AggregatePipeline::concatenate(result).unwrap();
        let order: Vec<_> = execution_order(&aggregate)
            .unwrap()
            .into_iter()
            .map(|c| c.kind.as_str())
            .collect();
        assert_eq!(order.first(), Some(&"ImportExampleGen"));
        assert_eq!(order.last(), Some(&EVALUATOR_KIND));
        assert_eq!(order.len(), 6);
    }
}
