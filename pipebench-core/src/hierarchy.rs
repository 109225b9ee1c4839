//! Definition Hierarchy
//!
//! Directed graph of `extends` relations between benchmark definitions.
//! Also used to order pipeline components by their channel dependencies.

use fxhash::{FxHashMap, FxHashSet};
use thiserror::Error;

/// Errors from graph operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum GraphError {
    /// A cycle was found while ordering the graph.
    #[error("Cycle detected: {0}")]
    CycleDetected(String),

    /// A definition extends a parent that was never registered.
    #[error("Unknown parent `{parent}` extended by `{child}`")]
    UnknownParent {
        /// Definition naming the parent
        child: String,
        /// Missing parent name
        parent: String,
    },

    /// A component reads a channel whose producer is not in the pipeline.
    #[error("Component `{consumer}` reads from unknown producer `{producer}`")]
    UnknownProducer {
        /// Component with the dangling input
        consumer: String,
        /// Producer id it refers to
        producer: String,
    },
}

/// Directed graph keyed by node name.
///
/// Edges point from a node to its dependents: a parent definition to its
/// subclasses, or a producer component to its consumers.
#[derive(Debug, Default, Clone)]
pub struct HierarchyGraph {
    /// Node -> direct dependents
    edges: FxHashMap<String, FxHashSet<String>>,
    nodes: FxHashSet<String>,
}

impl HierarchyGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node
    pub fn add_node(&mut self, id: impl Into<String>) {
        self.nodes.insert(id.into());
    }

    /// Add an edge: `child` extends (or depends on) `parent`
    pub fn add_edge(&mut self, parent: impl Into<String>, child: impl Into<String>) {
        let parent = parent.into();
        let child = child.into();

        self.nodes.insert(parent.clone());
        self.nodes.insert(child.clone());

        self.edges.entry(parent).or_default().insert(child);
    }

    /// Whether the node exists
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains(id)
    }

    /// Direct dependents of a node
    pub fn children(&self, id: &str) -> Option<&FxHashSet<String>> {
        self.edges.get(id)
    }

    /// Every node transitively reachable from `root`, excluding `root`.
    ///
    /// Cycles are tolerated; each node is reported once.
    pub fn descendants(&self, root: &str) -> FxHashSet<String> {
        let mut seen = FxHashSet::default();
        let mut stack: Vec<&str> = vec![root];

        while let Some(node) = stack.pop() {
            let Some(children) = self.edges.get(node) else {
                continue;
            };
            for child in children {
                if child != root && seen.insert(child.clone()) {
                    stack.push(child);
                }
            }
        }

        seen
    }

    /// Perform topological sort
    ///
    /// Returns nodes with every parent before its dependents.
    pub fn topological_sort(&self) -> Result<Vec<String>, GraphError> {
        let mut result = Vec::new();
        let mut visited = FxHashSet::default();
        let mut temp_visited = FxHashSet::default();

        // Sorted roots keep the order stable across runs
        let mut nodes: Vec<&String> = self.nodes.iter().collect();
        nodes.sort();

        for node in nodes {
            if !visited.contains(node) {
                self.visit(node, &mut visited, &mut temp_visited, &mut result)?;
            }
        }

        // DFS emits dependents first
        result.reverse();
        Ok(result)
    }

    fn visit(
        &self,
        node: &str,
        visited: &mut FxHashSet<String>,
        temp_visited: &mut FxHashSet<String>,
        result: &mut Vec<String>,
    ) -> Result<(), GraphError> {
        if temp_visited.contains(node) {
            return Err(GraphError::CycleDetected(node.to_string()));
        }

        if visited.contains(node) {
            return Ok(());
        }

        temp_visited.insert(node.to_string());

        if let Some(children) = self.edges.get(node) {
            let mut children: Vec<&String> = children.iter().collect();
            children.sort();
            for child in children {
                self.visit(child, visited, temp_visited, result)?;
            }
        }

        temp_visited.remove(node);
        visited.insert(node.to_string());
        result.push(node.to_string());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> FxHashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_descendants_no_children() {
        let mut graph = HierarchyGraph::new();
        graph.add_node("Base");
        assert!(graph.descendants("Base").is_empty());
        assert!(graph.descendants("Missing").is_empty());
    }

    #[test]
    fn test_descendants_two_levels() {
        let mut graph = HierarchyGraph::new();
        graph.add_edge("Base", "Sub1");
        graph.add_edge("Base", "Sub2");
        graph.add_edge("Sub1", "Sub11");
        graph.add_edge("Sub1", "Sub12");
        graph.add_edge("Sub2", "Sub21");

        assert_eq!(
            graph.descendants("Base"),
            set(&["Sub1", "Sub2", "Sub11", "Sub12", "Sub21"])
        );
        assert_eq!(graph.descendants("Sub1"), set(&["Sub11", "Sub12"]));
    }

    #[test]
    fn test_descendants_tolerates_cycles() {
        let mut graph = HierarchyGraph::new();
        graph.add_edge("a", "b");
        graph.add_edge("b", "c");
        graph.add_edge("c", "a");

        assert_eq!(graph.descendants("a"), set(&["b", "c"]));
    }

    #[test]
    fn test_topological_sort() {
        let mut graph = HierarchyGraph::new();

        graph.add_edge("example_gen", "statistics_gen");
        graph.add_edge("statistics_gen", "schema_gen");
        graph.add_edge("example_gen", "transform");
        graph.add_edge("schema_gen", "transform");

        let sorted = graph.topological_sort().unwrap();
        let pos = |id: &str| sorted.iter().position(|x| x == id).unwrap();

        assert!(pos("example_gen") < pos("statistics_gen"));
        assert!(pos("statistics_gen") < pos("schema_gen"));
        assert!(pos("schema_gen") < pos("transform"));
    }

    #[test]
    fn test_cycle_detection() {
        let mut graph = HierarchyGraph::new();

        graph.add_edge("a", "b");
        graph.add_edge("b", "c");
        graph.add_edge("c", "a"); // Creates cycle

        let result = graph.topological_sort();
        assert!(matches!(result, Err(GraphError::CycleDetected(_))));
    }
}
