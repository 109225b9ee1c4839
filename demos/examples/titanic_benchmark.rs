//! Titanic Benchmark
//!
//! One benchmark running the standard tabular pipeline on the Titanic
//! dataset. The dataset description is embedded so the demo runs without a
//! prepared catalog.
//!
//! Run with: cargo run --example titanic_benchmark -p pipebench-demos
//! Compile a package instead: add `--config '{"cluster_config": {}}'`

use pipebench::prelude::*;
use pipebench_demos::{CatalogDataset, TabularPipeline};

const TITANIC_INFO: &str = r#"{
    "name": "titanic",
    "description": "Passenger survival on the Titanic",
    "data_dir": "datasets/titanic/4.0.0",
    "splits": {
        "train": {"filenames": ["titanic-train.tfrecord-00000-of-00001"]}
    },
    "supervised_keys": ["features", "survived"]
}"#;

/// Statistics, schema, transform and trainer on Titanic.
#[benchmark(tags = "tabular")]
fn titanic_benchmark(b: &mut Benchmark) -> anyhow::Result<()> {
    let dataset = CatalogDataset::from_json(TITANIC_INFO)?;
    let task = dataset.task()?;
    tracing::info!(label = %task.label_key, "predicting");

    let pipeline = TabularPipeline::new(&dataset);
    b.evaluate_pipeline(&pipeline)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    pipebench::run()
}
