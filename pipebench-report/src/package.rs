//! Pipeline Package
//!
//! The compiled form of an aggregate pipeline, written to disk for a cluster
//! runner to pick up. Each component lists the ids it depends on so the
//! runner can schedule without re-deriving the graph from channels.

use pipebench_core::{AggregatePipeline, Channel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Compiled aggregate pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelinePackage {
    /// Pipeline name
    pub name: String,
    /// Artifact root directory
    pub root: Option<String>,
    /// Target namespace
    pub namespace: Option<String>,
    /// Container image running the components
    pub image: Option<String>,
    /// Benchmarks included, in aggregate order
    pub benchmarks: Vec<String>,
    /// Components, in aggregate order
    pub components: Vec<PackageComponent>,
}

/// One component of a package
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageComponent {
    /// Qualified component id
    pub id: String,
    /// Component kind
    pub kind: String,
    /// Input channels by key
    pub inputs: BTreeMap<String, PackageChannel>,
    /// Output artifact types by key
    pub outputs: BTreeMap<String, String>,
    /// Ids of components this one reads from, sorted
    pub upstream: Vec<String>,
    /// Execution parameters
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

/// Serialized channel reference
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageChannel {
    /// Producer component id
    pub producer: String,
    /// Output key on the producer
    pub key: String,
    /// Artifact type
    pub artifact_type: String,
}

impl From<&Channel> for PackageChannel {
    fn from(channel: &Channel) -> Self {
        Self {
            producer: channel.producer.clone(),
            key: channel.key.clone(),
            artifact_type: channel.artifact_type.clone(),
        }
    }
}

impl PipelinePackage {
    /// Compile an aggregate pipeline.
    pub fn compile(name: impl Into<String>, aggregate: &AggregatePipeline) -> Self {
        let components = aggregate
            .components()
            .iter()
            .map(|component| {
                let mut upstream: Vec<String> =
                    component.upstream().map(str::to_string).collect();
                upstream.sort();
                upstream.dedup();
                PackageComponent {
                    id: component.id.clone(),
                    kind: component.kind.clone(),
                    inputs: component
                        .inputs
                        .iter()
                        .map(|(key, channel)| (key.clone(), PackageChannel::from(channel)))
                        .collect(),
                    outputs: component.outputs.clone(),
                    upstream,
                    parameters: component.parameters.clone(),
                }
            })
            .collect();

        Self {
            name: name.into(),
            root: None,
            namespace: None,
            image: None,
            benchmarks: aggregate
                .benchmark_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            components,
        }
    }

    /// Set the artifact root
    pub fn with_root(mut self, root: Option<String>) -> Self {
        self.root = root;
        self
    }

    /// Set the namespace
    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }

    /// Set the container image
    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
