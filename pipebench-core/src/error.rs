//! Error types for benchmark definition, execution and aggregation.

use thiserror::Error;

/// Errors raised by a benchmark definition or its instances.
///
/// These signal authoring bugs. They are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum BenchmarkError {
    /// `evaluate()` produced a name that was already evaluated in this instance.
    #[error(
        "benchmark `{0}` was already evaluated; call evaluate() once per benchmark or sub-benchmark"
    )]
    DuplicateEvaluation(String),

    /// Tried to instantiate a definition that has no entry point.
    #[error("cannot instantiate abstract benchmark definition `{0}`")]
    AbstractDefinition(String),

    /// An instance was asked to run a second time.
    #[error("benchmark instance `{0}` has already run")]
    AlreadyRun(String),
}

/// Invariant violations found while concatenating benchmark results.
///
/// Names are unique by construction, so either of these points at a naming
/// or replication bug rather than user error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AggregateError {
    /// Two named pipelines share a fully-qualified name.
    #[error("duplicate benchmark name in aggregate: {0}")]
    DuplicateName(String),

    /// Two components share an id after qualification.
    #[error("duplicate component id in aggregate: {0}")]
    DuplicateComponent(String),
}

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// A definition with this name is already registered.
    #[error("benchmark definition `{0}` is already registered")]
    DuplicateDefinition(String),
}
