//! Benchmark Planner
//!
//! Selects and expands benchmark instances before they run, and builds the
//! name filter applied to the pipelines they produce.
//!
//! Filtering options:
//! - Tag inclusion/exclusion on definitions
//! - Anchored regex matching on produced pipeline names
//!
//! Ordering: instances are sorted by name for deterministic execution.

use pipebench_core::BenchmarkInstance;
use regex::Regex;

/// Execution plan for benchmarks
pub struct ExecutionPlan {
    /// Ordered list of instances to run
    pub instances: Vec<BenchmarkInstance>,
}

/// Build an execution plan from discovered instances
///
/// Applies the tag filters and returns the instances in deterministic order.
pub fn build_plan(
    instances: impl IntoIterator<Item = BenchmarkInstance>,
    tag: Option<&str>,
    skip_tag: Option<&str>,
) -> ExecutionPlan {
    let mut selected: Vec<_> = instances
        .into_iter()
        .filter(|instance| {
            let tags = instance.def().tags;

            if let Some(t) = tag {
                if !tags.contains(&t) {
                    return false;
                }
            }

            if let Some(st) = skip_tag {
                if tags.contains(&st) {
                    return false;
                }
            }

            true
        })
        .collect();

    selected.sort_by_key(|instance| instance.name());

    ExecutionPlan {
        instances: selected,
    }
}

/// Expand every instance into `runs` replicas
pub fn expand_replicas(instances: Vec<BenchmarkInstance>, runs: u32) -> Vec<BenchmarkInstance> {
    instances
        .into_iter()
        .flat_map(|instance| instance.replicate(runs))
        .collect()
}

/// Inclusion filter on fully-qualified pipeline names.
///
/// The pattern is anchored at the start of the name; an empty pattern matches
/// everything.
#[derive(Debug, Clone)]
pub struct NameFilter {
    pattern: String,
    regex: Option<Regex>,
}

impl NameFilter {
    /// Compile a filter
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = if pattern.is_empty() {
            None
        } else {
            Some(Regex::new(&format!("^(?:{pattern})"))?)
        };
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Filter that keeps every name
    pub fn match_all() -> Self {
        Self {
            pattern: String::new(),
            regex: None,
        }
    }

    /// Whether `name` passes
    pub fn is_match(&self, name: &str) -> bool {
        self.regex.as_ref().is_none_or(|re| re.is_match(name))
    }

    /// Pattern as given
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}
