//! OpenML Suite
//!
//! One benchmark per dataset family, with a sub-benchmark per dataset so
//! every dataset gets its own named pipeline:
//!
//! ```text
//! OpenmlBinary.benchmark.credit_g
//! OpenmlBinary.benchmark.titanic
//! OpenmlMulticlass.benchmark.fashion_mnist
//! ```
//!
//! Run with: cargo run --example openml_suite -p pipebench-demos
//! Replicate: add `--runs-per-benchmark 3`
//! Only one dataset: pass a filter such as `'.*titanic.*'`

use pipebench::prelude::*;
use pipebench_demos::{CatalogDataset, DatasetInfo, SplitInfo, TabularPipeline};
use std::collections::BTreeMap;

#[abstract_benchmark(description = "Benchmarks over OpenML tasks")]
struct OpenmlFamily;

fn dataset(name: &str) -> anyhow::Result<CatalogDataset> {
    let splits = ["train", "test"]
        .into_iter()
        .map(|split| {
            (
                split.to_string(),
                SplitInfo {
                    filenames: vec![format!("{name}-{split}.tfrecord-00000-of-00001")],
                },
            )
        })
        .collect::<BTreeMap<_, _>>();

    Ok(CatalogDataset::from_info(DatasetInfo {
        name: name.to_string(),
        description: format!("OpenML {name}"),
        data_dir: format!("datasets/{name}/1.0.0"),
        splits,
        supervised_keys: Some(("features".to_string(), "label".to_string())),
    })?)
}

fn evaluate_datasets(b: &mut Benchmark, names: &[&str]) -> anyhow::Result<()> {
    for name in names {
        let dataset = dataset(name)?;
        let mut sub = b.sub_benchmark(*name);
        sub.evaluate_pipeline(&TabularPipeline::new(&dataset).with_steps(1_000, 500))?;
    }
    Ok(())
}

#[benchmark(extends = "OpenmlFamily", tags = "binary")]
fn openml_binary(b: &mut Benchmark) -> anyhow::Result<()> {
    evaluate_datasets(b, &["titanic", "credit_g"])
}

#[benchmark(extends = "OpenmlFamily", tags = "multiclass")]
fn openml_multiclass(b: &mut Benchmark) -> anyhow::Result<()> {
    evaluate_datasets(b, &["fashion_mnist"])
}

fn main() -> anyhow::Result<()> {
    pipebench::run()
}
