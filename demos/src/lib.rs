//! Pipebench Demos
//!
//! Reference collaborators for running pipebench end to end, plus runnable
//! benchmark binaries. This crate is not published.
//!
//! Run any example with:
//! ```sh
//! cargo run --example <name> -p pipebench-demos -- [FILTER] [--config <json|path>]
//! ```
//!
//! | Example | Scenario |
//! |---------|----------|
//! | `titanic_benchmark` | One benchmark over one catalog dataset |
//! | `openml_suite` | One sub-benchmark per dataset, replicated and filtered |

mod catalog;
mod tabular;

pub use catalog::{CatalogDataset, DatasetError, DatasetInfo, Split, SplitInfo, Task, TaskType};
pub use tabular::TabularPipeline;
