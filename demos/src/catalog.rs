//! Catalog Datasets
//!
//! A dataset prepared on disk and described by a `dataset_info.json`:
//!
//! ```json
//! {
//!   "name": "titanic",
//!   "description": "Passenger survival",
//!   "data_dir": "/data/titanic/4.0.0",
//!   "splits": {"train": {"filenames": ["titanic-train.tfrecord-00000-of-00001"]}},
//!   "supervised_keys": ["features", "survived"]
//! }
//! ```
//!
//! Every split must be stored in exactly one file. The dataset exposes a
//! single `ImportExampleGen` component reading all splits.

use pipebench::{Channel, Component};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading a catalog dataset
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DatasetError {
    /// A split is stored in more or fewer than one file.
    #[error("split `{split}` of `{dataset}` has {count} files, expected exactly one")]
    SplitFileCount {
        /// Dataset name
        dataset: String,
        /// Split name
        split: String,
        /// Number of files found
        count: usize,
    },

    /// The dataset declares no splits.
    #[error("dataset `{0}` declares no splits")]
    NoSplits(String),

    /// The dataset has no supervised keys, so no task can be derived.
    #[error("dataset `{0}` has no supervised keys")]
    MissingSupervisedKeys(String),

    /// The info file could not be parsed.
    #[error("failed to parse dataset info: {0}")]
    Parse(#[from] serde_json::Error),

    /// The info file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Dataset description as stored in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetInfo {
    /// Dataset name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Directory holding the split files
    pub data_dir: String,
    /// Splits by name
    #[serde(default)]
    pub splits: BTreeMap<String, SplitInfo>,
    /// `(input, label)` keys for supervised tasks
    #[serde(default)]
    pub supervised_keys: Option<(String, String)>,
}

/// Files backing one split
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SplitInfo {
    /// Split files, relative to the data directory
    pub filenames: Vec<String>,
}

/// One split read by the example generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    /// Split name
    pub name: String,
    /// File pattern, relative to the data directory
    pub pattern: String,
}

/// Kind of learning task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Two-class classification
    BinaryClassification,
}

/// Learning task derived from a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Dataset the task is defined on
    pub dataset_name: String,
    /// Kind of task
    pub task_type: TaskType,
    /// Number of label classes
    pub num_classes: u32,
    /// Dataset description
    pub description: String,
    /// Feature holding the label
    pub label_key: String,
}

/// A catalog dataset wired into a pipeline
#[derive(Debug, Clone)]
pub struct CatalogDataset {
    info: DatasetInfo,
    splits: Vec<Split>,
    example_gen: Component,
}

impl CatalogDataset {
    /// Build the dataset from its description.
    pub fn from_info(info: DatasetInfo) -> Result<Self, DatasetError> {
        if info.splits.is_empty() {
            return Err(DatasetError::NoSplits(info.name));
        }

        let mut splits = Vec::with_capacity(info.splits.len());
        for (name, split) in &info.splits {
            let [pattern] = split.filenames.as_slice() else {
                return Err(DatasetError::SplitFileCount {
                    dataset: info.name.clone(),
                    split: name.clone(),
                    count: split.filenames.len(),
                });
            };
            splits.push(Split {
                name: name.clone(),
                pattern: pattern.clone(),
            });
        }
        tracing::info!(dataset = %info.name, splits = ?splits, "prepared dataset");

        let example_gen = splits.iter().fold(
            Component::new("ImportExampleGen")
                .output("examples", "Examples")
                .parameter("input_base", &info.data_dir),
            |component, split| {
                component.parameter(format!("split.{}", split.name), &split.pattern)
            },
        );
        Ok(Self {
            info,
            splits,
            example_gen,
        })
    }

    /// Parse a `dataset_info.json` document
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        Self::from_info(serde_json::from_str(json)?)
    }

    /// Load a `dataset_info.json` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Dataset name
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Dataset description
    pub fn info(&self) -> &DatasetInfo {
        &self.info
    }

    /// Splits read by the example generator, sorted by name
    pub fn splits(&self) -> &[Split] {
        &self.splits
    }

    /// Components the dataset contributes
    pub fn components(&self) -> Vec<Component> {
        vec![self.example_gen.clone()]
    }

    /// Labeled examples for every split
    pub fn examples(&self) -> Channel {
        // The example generator always declares this output
        Channel::new(self.example_gen.id.clone(), "examples", "Examples")
    }

    /// Binary classification task on the supervised label.
    // TODO: infer num_classes from the label vocabulary once schema inference runs
    pub fn task(&self) -> Result<Task, DatasetError> {
        let (_, label_key) = self
            .info
            .supervised_keys
            .as_ref()
            .ok_or_else(|| DatasetError::MissingSupervisedKeys(self.info.name.clone()))?;
        Ok(Task {
            dataset_name: self.info.name.clone(),
            task_type: TaskType::BinaryClassification,
            num_classes: 2,
            description: self.info.description.clone(),
            label_key: label_key.clone(),
        })
    }
}
