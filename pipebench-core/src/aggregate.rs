//! Aggregate Pipeline
//!
//! Concatenates named pipelines into the single unit handed to an
//! orchestrator. Every component id is qualified with the benchmark name it
//! came from, and channels between components of the same pipeline are
//! rewired to the qualified ids, so pipelines sharing component ids never
//! collide.

use crate::error::AggregateError;
use crate::naming::qualify;
use crate::pipeline::Component;
use crate::result::NamedPipeline;
use fxhash::FxHashSet;

/// One benchmark's slice of the aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateEntry {
    /// Fully-qualified benchmark name
    pub name: String,
    /// Qualified ids of the components it contributed
    pub component_ids: Vec<String>,
}

/// All surviving pipelines of a run, concatenated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatePipeline {
    components: Vec<Component>,
    entries: Vec<AggregateEntry>,
}

impl AggregatePipeline {
    /// Concatenate pipelines in order.
    ///
    /// Fails if two pipelines share a name or two components end up with the
    /// same qualified id.
    pub fn concatenate(
        pipelines: impl IntoIterator<Item = NamedPipeline>,
    ) -> Result<Self, AggregateError> {
        let mut names = FxHashSet::default();
        let mut ids = FxHashSet::default();
        let mut aggregate = Self::default();

        for pipeline in pipelines {
            if !names.insert(pipeline.name.clone()) {
                return Err(AggregateError::DuplicateName(pipeline.name));
            }

            let local: FxHashSet<String> =
                pipeline.components.iter().map(|c| c.id.clone()).collect();
            let mut component_ids = Vec::with_capacity(pipeline.components.len());

            for mut component in pipeline.components {
                component.id = qualify(&pipeline.name, &component.id);
                for channel in component.inputs.values_mut() {
                    if local.contains(&channel.producer) {
                        channel.producer = qualify(&pipeline.name, &channel.producer);
                    }
                }
                if !ids.insert(component.id.clone()) {
                    return Err(AggregateError::DuplicateComponent(component.id));
                }
                component_ids.push(component.id.clone());
                aggregate.components.push(component);
            }

            aggregate.entries.push(AggregateEntry {
                name: pipeline.name,
                component_ids,
            });
        }

        Ok(aggregate)
    }

    /// Every component, in concatenation order
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Per-benchmark entries, in concatenation order
    pub fn entries(&self) -> &[AggregateEntry] {
        &self.entries
    }

    /// Benchmark names the aggregate was built from
    pub fn benchmark_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Whether no pipeline survived
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Channel;

    fn pipeline(name: &str) -> NamedPipeline {
        let example_gen = Component::new("ImportExampleGen").output("examples", "Examples");
        let examples = example_gen.channel("examples").unwrap();
        let trainer = Component::new("Trainer")
            .input("examples", &examples)
            .output("model", "Model");
        let model = trainer.channel("model").unwrap();
        NamedPipeline {
            name: name.to_string(),
            components: vec![example_gen, trainer],
            examples,
            model,
        }
    }

    #[test]
    fn test_concatenate_qualifies_ids() {
        let aggregate =
            AggregatePipeline::concatenate(vec![pipeline("A.benchmark"), pipeline("B.benchmark")])
                .unwrap();

        assert_eq!(aggregate.benchmark_names(), vec!["A.benchmark", "B.benchmark"]);
        let ids: Vec<_> = aggregate.components().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "A.benchmark.ImportExampleGen",
                "A.benchmark.Trainer",
                "B.benchmark.ImportExampleGen",
                "B.benchmark.Trainer",
            ]
        );
        assert_eq!(
            aggregate.components()[1].inputs["examples"].producer,
            "A.benchmark.ImportExampleGen"
        );
        assert_eq!(
            aggregate.entries()[1].component_ids,
            vec!["B.benchmark.ImportExampleGen", "B.benchmark.Trainer"]
        );
    }

    #[test]
    fn test_external_producers_untouched() {
        let external = Channel::new("SharedGen", "examples", "Examples");
        let mut named = pipeline("A.benchmark");
        named.components[1] = named.components[1].clone().input("extra", &external);

        let aggregate = AggregatePipeline::concatenate(vec![named]).unwrap();
        assert_eq!(aggregate.components()[1].inputs["extra"].producer, "SharedGen");
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = AggregatePipeline::concatenate(vec![pipeline("A.benchmark"), pipeline("A.benchmark")])
            .unwrap_err();
        assert_eq!(err, AggregateError::DuplicateName("A.benchmark".to_string()));
    }

    #[test]
    fn test_duplicate_component_rejected() {
        let mut named = pipeline("A.benchmark");
        named.components.push(Component::new("Trainer"));
        assert!(matches!(
            AggregatePipeline::concatenate(vec![named]),
            Err(AggregateError::DuplicateComponent(id)) if id == "A.benchmark.Trainer"
        ));
    }

    #[test]
    fn test_empty() {
        let aggregate = AggregatePipeline::concatenate(Vec::new()).unwrap();
        assert!(aggregate.is_empty());
        assert!(aggregate.components().is_empty());
    }
}
