//! Dependency graph module.
//!
//! Tracks, for every named value, which other values must be recomputed
//! when it changes. Edges point from a value to its dependents (the
//! consumers of its value), so a cascade walks the graph in edge
//! direction. The graph must stay acyclic; assignment paths enforce that
//! by mutating a clone and swapping it in only after cycle detection
//! passes, which makes the transactional guarantee structural.

use crate::value_id::ValueId;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// Name-keyed dependency graph over the sheet's values.
///
/// Nodes are created lazily the first time a name participates in any
/// expression, as a referenced source or as an expression target. `Clone`
/// is cheap enough to build a candidate graph per assignment, which is how
/// cycle rejection rolls back without bookkeeping.
///
/// # Examples
///
/// ```rust
/// use charsheet::{DependencyGraph, ValueId};
///
/// let mut graph = DependencyGraph::new();
/// let exp = ValueId::new("creoexp");
/// let creo = ValueId::new("creo");
///
/// // creo is computed from creoexp
/// graph.set_sources(&creo, &[exp.clone()]);
/// assert_eq!(graph.dependents_of(&exp), vec![creo.clone()]);
/// assert!(graph.find_cycle_from(&creo).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<ValueId, ()>,
    node_map: HashMap<ValueId, NodeIndex>,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_node(&mut self, name: &ValueId) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(name) {
            idx
        } else {
            let idx = self.graph.add_node(name.clone());
            self.node_map.insert(name.clone(), idx);
            idx
        }
    }

    /// Whether the name participates in the graph at all.
    pub fn contains(&self, name: &ValueId) -> bool {
        self.node_map.contains_key(name)
    }

    /// All names in the graph.
    pub fn nodes(&self) -> Vec<ValueId> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx].clone())
            .collect()
    }

    /// Record that `dependent` is computed from `source`, creating both
    /// nodes as needed. Duplicate edges collapse.
    pub fn add_dependency(&mut self, source: &ValueId, dependent: &ValueId) {
        let source_idx = self.ensure_node(source);
        let dependent_idx = self.ensure_node(dependent);
        self.graph.update_edge(source_idx, dependent_idx, ());
    }

    /// Replace the set of sources `name` is computed from. The name's own
    /// dependents are untouched; only its incoming edges are rewritten.
    /// This is the primitive assignment paths use on a candidate clone.
    pub fn set_sources(&mut self, name: &ValueId, sources: &[ValueId]) {
        self.clear_sources(name);
        for source in sources {
            self.add_dependency(source, name);
        }
    }

    /// Drop every incoming edge of `name`, e.g. when the name reverts from
    /// an expression to a plain base value. No-op for unknown names.
    pub fn clear_sources(&mut self, name: &ValueId) {
        let idx = match self.node_map.get(name) {
            Some(&idx) => idx,
            None => return,
        };
        while let Some(edge) = self.graph.first_edge(idx, Direction::Incoming) {
            self.graph.remove_edge(edge);
        }
    }

    /// The names whose values must be recomputed when `name` changes.
    pub fn dependents_of(&self, name: &ValueId) -> Vec<ValueId> {
        let idx = match self.node_map.get(name) {
            Some(&idx) => idx,
            None => return Vec::new(),
        };
        self.graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|neighbor| self.graph[neighbor].clone())
            .collect()
    }

    /// Depth-first cycle scan starting from `name`, following dependent
    /// edges. Returns the closed loop (`[a, b, a]`) if one exists.
    ///
    /// Standard DFS coloring via `visited` + `on_stack`: a back-edge into
    /// the stack set is a cycle. Starting from the name being assigned is
    /// sufficient because every new edge an assignment adds points into
    /// that name, so any new cycle passes through it.
    pub fn find_cycle_from(&self, name: &ValueId) -> Option<Vec<ValueId>> {
        let &start = self.node_map.get(name)?;
        let mut visited = HashSet::new();
        let mut on_stack = HashSet::new();
        let mut path = Vec::new();
        self.dfs_cycle(start, &mut visited, &mut on_stack, &mut path)
    }

    fn dfs_cycle(
        &self,
        node: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        on_stack: &mut HashSet<NodeIndex>,
        path: &mut Vec<ValueId>,
    ) -> Option<Vec<ValueId>> {
        visited.insert(node);
        on_stack.insert(node);
        path.push(self.graph[node].clone());

        for neighbor in self.graph.neighbors_directed(node, Direction::Outgoing) {
            if !visited.contains(&neighbor) {
                if let Some(cycle) = self.dfs_cycle(neighbor, visited, on_stack, path) {
                    return Some(cycle);
                }
            } else if on_stack.contains(&neighbor) {
                let closing = self.graph[neighbor].clone();
                let cycle_start = path
                    .iter()
                    .position(|name| *name == closing)
                    .unwrap_or(path.len() - 1);
                let mut cycle = path[cycle_start..].to_vec();
                cycle.push(closing);
                return Some(cycle);
            }
        }

        on_stack.remove(&node);
        path.pop();
        None
    }
}
