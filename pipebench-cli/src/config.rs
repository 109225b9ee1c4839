//! Runtime configuration
//!
//! A run is configured by a JSON document (passed inline or as a file via
//! `--config`) or by a `pipebench.toml` discovered by walking up from the
//! current directory. Exactly one execution target section must be present:
//!
//! ```json
//! {"local_config": {}, "pipeline_args": {"runs_per_benchmark": 3}}
//! ```
//!
//! `pipeline_args.runs_per_benchmark` overrides the `--runs-per-benchmark`
//! flag when present. Whichever value wins must be a positive integer.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the discovered configuration file
pub const CONFIG_FILE_NAME: &str = "pipebench.toml";

/// Configuration errors. All of them are raised before any benchmark runs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Neither `local_config` nor `cluster_config` was given.
    #[error("runtime config must contain an execution target section (`local_config` or `cluster_config`)")]
    MissingExecutionTarget,

    /// More than one execution target was given.
    #[error("runtime config has conflicting execution targets: {0}")]
    ConflictingExecutionTargets(String),

    /// The resolved replica count is not a positive integer.
    #[error("runs_per_benchmark must be a positive integer, got {value} (from {source_name})")]
    InvalidRunsPerBenchmark {
        /// Offending value
        value: i64,
        /// Where the value came from
        source_name: &'static str,
    },

    /// The configuration document could not be parsed.
    #[error("failed to parse runtime config: {0}")]
    Parse(String),

    /// The configuration file could not be read.
    #[error("failed to read runtime config {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Runtime configuration as written by the user
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RuntimeConfig {
    /// Run the aggregate pipeline in-process
    #[serde(default)]
    pub local_config: Option<LocalConfig>,
    /// Compile the aggregate pipeline into a package for a cluster runner
    #[serde(default)]
    pub cluster_config: Option<ClusterConfig>,
    /// Pipeline-level arguments
    #[serde(default)]
    pub pipeline_args: PipelineArgs,
}

/// Local execution settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalConfig {
    /// Show a progress bar while stepping through components
    #[serde(default = "default_show_progress")]
    pub show_progress: bool,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            show_progress: default_show_progress(),
        }
    }
}

fn default_show_progress() -> bool {
    true
}

/// Cluster compilation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClusterConfig {
    /// Directory the pipeline package is written to
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Namespace the pipeline is submitted to
    #[serde(default)]
    pub namespace: Option<String>,
    /// Container image running the components
    #[serde(default)]
    pub image: Option<String>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            namespace: None,
            image: None,
        }
    }
}

fn default_output_dir() -> String {
    "target/pipebench".to_string()
}

/// Arguments applying to the whole aggregate pipeline
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PipelineArgs {
    /// Replicas per benchmark; overrides the command-line default
    #[serde(default)]
    pub runs_per_benchmark: Option<i64>,
    /// Name of the aggregate pipeline
    #[serde(default)]
    pub pipeline_name: Option<String>,
    /// Root directory for pipeline artifacts
    #[serde(default)]
    pub pipeline_root: Option<String>,
}

/// Where the aggregate pipeline runs
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionTarget {
    /// In-process execution
    Local(LocalConfig),
    /// Package compilation for a cluster runner
    Cluster(ClusterConfig),
}

impl ExecutionTarget {
    /// Short name for logs and reports
    pub fn name(&self) -> &'static str {
        match self {
            ExecutionTarget::Local(_) => "local",
            ExecutionTarget::Cluster(_) => "cluster",
        }
    }
}

/// Configuration that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    /// Selected execution target
    pub target: ExecutionTarget,
    /// Replicas per benchmark, at least 1
    pub runs_per_benchmark: u32,
    /// Pipeline-level arguments
    pub pipeline_args: PipelineArgs,
}

impl ValidatedConfig {
    /// Pipeline name, defaulting to `pipebench`
    pub fn pipeline_name(&self) -> &str {
        self.pipeline_args
            .pipeline_name
            .as_deref()
            .unwrap_or("pipebench")
    }
}

impl RuntimeConfig {
    /// Config with only a default local target
    pub fn local() -> Self {
        Self {
            local_config: Some(LocalConfig::default()),
            ..Self::default()
        }
    }

    /// Parse a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse a TOML document
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a `.json` or `.toml` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content),
        }
    }

    /// Resolve a `--config` argument: inline JSON, or a path to a config file.
    pub fn from_arg(arg: &str) -> Result<Self, ConfigError> {
        let trimmed = arg.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        if trimmed.starts_with('{') {
            Self::from_json(trimmed)
        } else {
            Self::load(trimmed)
        }
    }

    /// Discover configuration by walking up from the current directory.
    pub fn discover() -> Result<Option<Self>, ConfigError> {
        let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
            path: PathBuf::from("."),
            source,
        })?;
        Self::discover_from(&cwd)
    }

    /// Walk up from `start` and load the first `pipebench.toml` found.
    ///
    /// A file that exists but fails to load is an error, not a miss.
    pub fn discover_from(start: &Path) -> Result<Option<Self>, ConfigError> {
        for dir in start.ancestors() {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                tracing::debug!("using {}", config_path.display());
                return Self::load(&config_path).map(Some);
            }
        }
        Ok(None)
    }

    /// Validate against the command-line replica default.
    ///
    /// `pipeline_args.runs_per_benchmark` wins over `default_runs` when set.
    pub fn validate(&self, default_runs: i64) -> Result<ValidatedConfig, ConfigError> {
        let target = match (&self.local_config, &self.cluster_config) {
            (Some(local), None) => ExecutionTarget::Local(local.clone()),
            (None, Some(cluster)) => ExecutionTarget::Cluster(cluster.clone()),
            (None, None) => return Err(ConfigError::MissingExecutionTarget),
            (Some(_), Some(_)) => {
                return Err(ConfigError::ConflictingExecutionTargets(
                    "local_config, cluster_config".to_string(),
                ));
            }
        };

        let (value, source_name) = match self.pipeline_args.runs_per_benchmark {
            Some(value) => (value, "pipeline_args.runs_per_benchmark"),
            None => (default_runs, "--runs-per-benchmark"),
        };
        let runs_per_benchmark = u32::try_from(value)
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ConfigError::InvalidRunsPerBenchmark { value, source_name })?;

        Ok(ValidatedConfig {
            target,
            runs_per_benchmark,
            pipeline_args: self.pipeline_args.clone(),
        })
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Pipebench runtime configuration
# Exactly one execution target section must be present.

[local_config]
# Show a progress bar while stepping through components
show_progress = true

# Compile a pipeline package instead of running locally
# (remove [local_config] when enabling this)
# [cluster_config]
# output_dir = "target/pipebench"
# namespace = "benchmarks"
# image = "registry.example.com/pipebench:latest"

[pipeline_args]
# Replicas per benchmark (overrides --runs-per-benchmark)
# runs_per_benchmark = 3
# Name of the aggregate pipeline
pipeline_name = "pipebench"
# Root directory for pipeline artifacts
# pipeline_root = "target/pipebench/artifacts"
"#
        .to_string()
    }
}
