//! Cluster Orchestrator
//!
//! Compiles the aggregate into a [`PipelinePackage`] and writes it to
//! `<output_dir>/<pipeline_name>.json` for a cluster runner to submit.

use super::Orchestrator;
use crate::config::{ClusterConfig, ExecutionTarget, ValidatedConfig};
use anyhow::Context;
use pipebench_core::AggregatePipeline;
use pipebench_report::PipelinePackage;
use std::path::PathBuf;

/// Orchestrator writing a pipeline package
#[derive(Debug, Default, Clone, Copy)]
pub struct ClusterOrchestrator;

impl ClusterOrchestrator {
    /// Path the package for `config` is written to
    pub fn package_path(config: &ValidatedConfig) -> Option<PathBuf> {
        match &config.target {
            ExecutionTarget::Cluster(cluster) => Some(package_file(cluster, config)),
            ExecutionTarget::Local(_) => None,
        }
    }
}

fn package_file(cluster: &ClusterConfig, config: &ValidatedConfig) -> PathBuf {
    PathBuf::from(&cluster.output_dir).join(format!("{}.json", config.pipeline_name()))
}

impl Orchestrator for ClusterOrchestrator {
    fn name(&self) -> &'static str {
        "cluster"
    }

    fn run(&self, aggregate: &AggregatePipeline, config: &ValidatedConfig) -> anyhow::Result<()> {
        let ExecutionTarget::Cluster(cluster) = &config.target else {
            anyhow::bail!("cluster orchestrator requires a `cluster_config` section");
        };
        let path = package_file(cluster, config);

        let package = PipelinePackage::compile(config.pipeline_name(), aggregate)
            .with_root(config.pipeline_args.pipeline_root.clone())
            .with_namespace(cluster.namespace.clone())
            .with_image(cluster.image.clone());
        let json = package.to_json()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            benchmarks = package.benchmarks.len(),
            components = package.components.len(),
            "wrote pipeline package"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use pipebench_core::{Channel, Component, NamedPipeline};

    fn aggregate() -> AggregatePipeline {
        let example_gen = Component::new("ImportExampleGen").output("examples", "Examples");
        let examples = example_gen.channel("examples").unwrap();
        let trainer = Component::new("Trainer")
            .input("examples", &examples)
            .output("model", "Model");
        let model: Channel = trainer.channel("model").unwrap();
        AggregatePipeline::concatenate(vec![NamedPipeline {
            name: "Titanic.benchmark".to_string(),
            components: vec![example_gen, trainer],
            examples,
            model,
        }])
        .unwrap()
    }

    #[test]
    fn test_writes_package() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("packages");
        let json = format!(
            r#"{{"cluster_config": {{"output_dir": {:?}, "namespace": "bench"}},
                "pipeline_args": {{"pipeline_name": "nightly", "pipeline_root": "gs://bucket/root"}}}}"#,
            out.display().to_string()
        );
        let config = RuntimeConfig::from_json(&json).unwrap().validate(1).unwrap();

        ClusterOrchestrator.run(&aggregate(), &config).unwrap();

        let path = ClusterOrchestrator::package_path(&config).unwrap();
        assert_eq!(path, out.join("nightly.json"));
        let package: PipelinePackage =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(package.name, "nightly");
        assert_eq!(package.root.as_deref(), Some("gs://bucket/root"));
        assert_eq!(package.namespace.as_deref(), Some("bench"));
        assert_eq!(package.benchmarks, vec!["Titanic.benchmark"]);
        let ids: Vec<_> = package.components.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["Titanic.benchmark.ImportExampleGen", "Titanic.benchmark.Trainer"]
        );
    }

    #[test]
    fn test_rejects_local_target() {
        let config = RuntimeConfig::local().validate(1).unwrap();
        assert!(ClusterOrchestrator.run(&aggregate(), &config).is_err());
        assert_eq!(ClusterOrchestrator::package_path(&config), None);
    }
}
