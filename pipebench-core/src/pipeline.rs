//! Pipeline Handles
//!
//! Value objects standing in for the external component graph. The core
//! never looks inside a component beyond its id and channel wiring, which
//! it rewrites when pipelines are concatenated.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Component kind appended by [`crate::Benchmark::evaluate`].
pub const EVALUATOR_KIND: &str = "Evaluator";

/// Opaque handle to an artifact stream produced by a component output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Channel {
    /// Id of the producing component
    pub producer: String,
    /// Output key on the producer
    pub key: String,
    /// Artifact type carried by the channel (e.g. "Examples", "Model")
    pub artifact_type: String,
}

impl Channel {
    /// Create a channel handle
    pub fn new(
        producer: impl Into<String>,
        key: impl Into<String>,
        artifact_type: impl Into<String>,
    ) -> Self {
        Self {
            producer: producer.into(),
            key: key.into(),
            artifact_type: artifact_type.into(),
        }
    }
}

/// A single pipeline component handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Instance id, unique within a pipeline
    pub id: String,
    /// Component kind (e.g. "StatisticsGen", "Trainer")
    pub kind: String,
    /// Named input channels
    pub inputs: BTreeMap<String, Channel>,
    /// Named outputs and the artifact type each produces
    pub outputs: BTreeMap<String, String>,
    /// Execution parameters handed to the component runner
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

impl Component {
    /// Create a component whose id equals its kind.
    pub fn new(kind: impl Into<String>) -> Self {
        let kind = kind.into();
        Self {
            id: kind.clone(),
            kind,
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
            parameters: BTreeMap::new(),
        }
    }

    /// Override the instance id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Wire an input channel
    pub fn input(mut self, key: impl Into<String>, channel: &Channel) -> Self {
        self.inputs.insert(key.into(), channel.clone());
        self
    }

    /// Declare an output
    pub fn output(mut self, key: impl Into<String>, artifact_type: impl Into<String>) -> Self {
        self.outputs.insert(key.into(), artifact_type.into());
        self
    }

    /// Set an execution parameter
    pub fn parameter(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.parameters.insert(key.into(), value.to_string());
        self
    }

    /// Handle to one of this component's outputs.
    ///
    /// Returns `None` if the output was never declared.
    pub fn channel(&self, key: &str) -> Option<Channel> {
        self.outputs
            .get(key)
            .map(|artifact_type| Channel::new(&self.id, key, artifact_type))
    }

    /// Ids of the components this one reads from
    pub fn upstream(&self) -> impl Iterator<Item = &str> {
        self.inputs.values().map(|c| c.producer.as_str())
    }

    /// Evaluator consuming the given examples and model.
    pub(crate) fn evaluator(examples: &Channel, model: &Channel) -> Self {
        Component::new(EVALUATOR_KIND)
            .input("examples", examples)
            .input("model", model)
            .output("evaluation", "ModelEvaluation")
    }
}

/// Anything exposing a component list plus example and model channels.
///
/// Dataset adapters and pipeline builders implement this so benchmarks can
/// hand them straight to [`crate::Benchmark::evaluate_pipeline`].
pub trait PipelineSource {
    /// Ordered component handles
    fn components(&self) -> Vec<Component>;
    /// Labeled examples to evaluate against
    fn examples(&self) -> Channel;
    /// Trained model to evaluate
    fn model(&self) -> Channel;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_channels() {
        let example_gen = Component::new("ImportExampleGen").output("examples", "Examples");
        let examples = example_gen.channel("examples").unwrap();
        assert_eq!(examples.producer, "ImportExampleGen");
        assert_eq!(examples.artifact_type, "Examples");
        assert!(example_gen.channel("missing").is_none());

        let stats = Component::new("StatisticsGen")
            .with_id("stats")
            .input("examples", &examples);
        assert_eq!(stats.upstream().collect::<Vec<_>>(), vec!["ImportExampleGen"]);
    }

    #[test]
    fn test_component_parameters() {
        let trainer = Component::new("Trainer")
            .parameter("train_steps", 100)
            .parameter("module_file", "trainer.rs");
        assert_eq!(trainer.parameters["train_steps"], "100");
        assert_eq!(trainer.parameters["module_file"], "trainer.rs");
        assert!(Component::new("SchemaGen").parameters.is_empty());
    }

    #[test]
    fn test_evaluator_wiring() {
        let examples = Channel::new("gen", "examples", "Examples");
        let model = Channel::new("trainer", "model", "Model");
        let evaluator = Component::evaluator(&examples, &model);

        assert_eq!(evaluator.kind, EVALUATOR_KIND);
        assert_eq!(evaluator.inputs["examples"], examples);
        assert_eq!(evaluator.inputs["model"], model);
    }
}
