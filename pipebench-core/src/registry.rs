//! Benchmark Registry
//!
//! Definitions register themselves at link time through `inventory`. The
//! registry indexes them by name and keeps the `extends` hierarchy so that
//! every definition reachable from a base can be discovered.
//!
//! A process-wide registry is available through [`global`]; tests that need
//! isolation build their own [`Registry`] or call [`reset_global`].

use crate::error::{BenchmarkError, RegistryError};
use crate::hierarchy::{GraphError, HierarchyGraph};
use crate::instance::BenchmarkInstance;
use crate::BenchmarkDef;
use fxhash::FxHashSet;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

/// Implicit base every definition without an explicit parent extends
pub const ROOT_BENCHMARK: &str = "Benchmark";

/// Index of benchmark definitions and their hierarchy
#[derive(Debug, Clone)]
pub struct Registry {
    definitions: BTreeMap<&'static str, &'static BenchmarkDef>,
    hierarchy: HierarchyGraph,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        let mut hierarchy = HierarchyGraph::new();
        hierarchy.add_node(ROOT_BENCHMARK);
        Self {
            definitions: BTreeMap::new(),
            hierarchy,
        }
    }

    /// Registry seeded with every definition submitted via `inventory`.
    ///
    /// Duplicate names keep the first registration and log a warning.
    pub fn from_inventory() -> Self {
        let mut registry = Self::new();
        for def in inventory::iter::<BenchmarkDef> {
            if let Err(err) = registry.register(def) {
                tracing::warn!(file = def.file, line = def.line, "{err}");
            }
        }
        registry
    }

    /// Add a definition
    pub fn register(&mut self, def: &'static BenchmarkDef) -> Result<(), RegistryError> {
        if self.definitions.contains_key(def.name) {
            return Err(RegistryError::DuplicateDefinition(def.name.to_string()));
        }
        self.definitions.insert(def.name, def);
        self.hierarchy.add_edge(def.parent_name(), def.name);
        Ok(())
    }

    /// Remove every definition
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Look up a definition by name
    pub fn get(&self, name: &str) -> Option<&'static BenchmarkDef> {
        self.definitions.get(name).copied()
    }

    /// Number of registered definitions
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definitions sorted by name
    pub fn iter(&self) -> impl Iterator<Item = &'static BenchmarkDef> + '_ {
        self.definitions.values().copied()
    }

    /// Every definition transitively extending `base`, excluding `base`.
    ///
    /// Abstract intermediates are included. The result is unordered.
    pub fn find_subclasses(&self, base: &str) -> FxHashSet<&'static BenchmarkDef> {
        self.hierarchy
            .descendants(base)
            .iter()
            .filter_map(|name| self.get(name))
            .collect()
    }

    /// Instantiate every concrete definition under `base`, sorted by name.
    ///
    /// Abstract definitions are skipped rather than reported.
    pub fn concrete_instances(&self, base: &str) -> Vec<BenchmarkInstance> {
        let mut defs: Vec<_> = self
            .find_subclasses(base)
            .into_iter()
            .filter(|d| !d.is_abstract())
            .collect();
        defs.sort_by_key(|d| d.name);
        defs.into_iter()
            .filter_map(|d| BenchmarkInstance::new(d).ok())
            .collect()
    }

    /// Instantiate a definition by name.
    pub fn instantiate(&self, name: &str) -> Option<Result<BenchmarkInstance, BenchmarkError>> {
        self.get(name).map(BenchmarkInstance::new)
    }

    /// Check that every parent is registered and `extends` has no cycles.
    pub fn validate(&self) -> Result<(), GraphError> {
        for def in self.definitions.values() {
            let parent = def.parent_name();
            if parent != ROOT_BENCHMARK && !self.definitions.contains_key(parent) {
                return Err(GraphError::UnknownParent {
                    child: def.name.to_string(),
                    parent: parent.to_string(),
                });
            }
        }
        self.hierarchy.topological_sort().map(|_| ())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn global_cell() -> &'static Mutex<Registry> {
    static GLOBAL: OnceLock<Mutex<Registry>> = OnceLock::new();
    GLOBAL.get_or_init(|| Mutex::new(Registry::from_inventory()))
}

/// Lock the process-wide registry, seeding it from `inventory` on first use.
pub fn global() -> MutexGuard<'static, Registry> {
    // The registry only holds 'static references, so a poisoned lock is still consistent
    global_cell()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Discard runtime changes to the global registry and re-seed it from `inventory`.
pub fn reset_global() {
    *global() = Registry::from_inventory();
}
