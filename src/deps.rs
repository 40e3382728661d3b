//! Component Dependency Ordering
//!
//! Builds a graph of local `ref` edges between components and component sets
//! and produces a creation order in which every referenced id comes before
//! the ids that reference it.
//!
//! Ordering is Kahn's algorithm over the graph. Only when that leaves nodes
//! unplaced do we pay for a depth-first walk to recover one readable cycle.
//! `componentKey` and `iconRef` instances point outside the schema and never
//! create edges; `ref`s to unknown ids are skipped here and reported by the
//! caller at materialization time.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::schema::{ChildNode, Schema};

/// Outcome of dependency ordering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveResult {
    pub success: bool,
    /// Creation order; empty on failure
    pub order: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Local `ref` targets of one node tree, in first-seen order, deduplicated
pub fn extract_dependencies(children: &[ChildNode]) -> Vec<String> {
    let mut refs = Vec::new();
    let mut seen = HashSet::new();
    collect_refs(children, &mut refs, &mut seen);
    refs
}

fn collect_refs(children: &[ChildNode], refs: &mut Vec<String>, seen: &mut HashSet<String>) {
    for child in children {
        match child {
            ChildNode::Instance(instance) => {
                if let Some(target) = &instance.reference {
                    if seen.insert(target.clone()) {
                        refs.push(target.clone());
                    }
                }
            }
            ChildNode::Frame(frame) => collect_refs(&frame.children, refs, seen),
            _ => {}
        }
    }
}

/// Dependency graph over component and component set ids.
///
/// Edges run from a dependency to its dependent (`button -> card` when card
/// places a button), so in-degree counts unmet dependencies.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    node_indices: HashMap<String, NodeIndex>,
    /// id -> ids it requires, in first-seen order
    dependencies: HashMap<String, Vec<String>>,
    /// (referrer, missing target)
    unresolved: Vec<(String, String)>,
}

impl DependencyGraph {
    pub fn from_schema(schema: &Schema) -> Self {
        let mut graph = DiGraph::with_capacity(schema.definition_count(), schema.definition_count() * 2);
        let mut node_indices = HashMap::with_capacity(schema.definition_count());

        for id in schema.ids() {
            // duplicates are rejected by validation; keep the first if one slips through
            node_indices
                .entry(id.to_string())
                .or_insert_with(|| graph.add_node(id.to_string()));
        }

        let trees = schema
            .components
            .iter()
            .map(|c| (c.id.as_str(), c.children.as_slice()))
            .chain(
                schema
                    .component_sets
                    .iter()
                    .map(|s| (s.id.as_str(), s.base.children.as_slice())),
            );

        let mut dependencies: HashMap<String, Vec<String>> = HashMap::new();
        let mut unresolved = Vec::new();

        for (id, children) in trees {
            let Some(&dependent) = node_indices.get(id) else { continue };
            let deps = dependencies.entry(id.to_string()).or_default();
            for target in extract_dependencies(children) {
                match node_indices.get(&target) {
                    Some(&dependency) => {
                        if !deps.contains(&target) {
                            graph.add_edge(dependency, dependent, ());
                            deps.push(target);
                        }
                    }
                    None => unresolved.push((id.to_string(), target)),
                }
            }
        }

        Self {
            graph,
            node_indices,
            dependencies,
            unresolved,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Ids this id requires
    pub fn dependencies_of(&self, id: &str) -> &[String] {
        self.dependencies.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ids that require this id, in insertion order
    pub fn dependents_of(&self, id: &str) -> Vec<&str> {
        let Some(&idx) = self.node_indices.get(id) else {
            return Vec::new();
        };
        self.neighbors_in_order(idx)
            .into_iter()
            .map(|n| self.graph[n].as_str())
            .collect()
    }

    /// `ref`s that point at ids not defined in the schema, as (referrer, target)
    pub fn unresolved_refs(&self) -> &[(String, String)] {
        &self.unresolved
    }

    /// petgraph yields neighbors newest-edge-first; flip to insertion order
    fn neighbors_in_order(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors_directed(idx, Direction::Outgoing).collect();
        neighbors.reverse();
        neighbors
    }

    /// Kahn's algorithm; ties broken by definition order
    pub fn topological_order(&self) -> Result<Vec<String>, Vec<String>> {
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|n| self.graph.neighbors_directed(n, Direction::Incoming).count())
            .collect();

        let mut queue: VecDeque<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|n| in_degree[n.index()] == 0)
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(node) = queue.pop_front() {
            order.push(self.graph[node].clone());
            for dependent in self.neighbors_in_order(node) {
                let degree = &mut in_degree[dependent.index()];
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(dependent);
                }
            }
        }

        if order.len() == self.graph.node_count() {
            return Ok(order);
        }

        let placed: HashSet<&str> = order.iter().map(String::as_str).collect();
        let start = self
            .graph
            .node_indices()
            .map(|n| self.graph[n].as_str())
            .find(|id| !placed.contains(id));

        let cycle = start.and_then(|id| self.find_cycle(id)).unwrap_or_default();
        Err(cycle)
    }

    /// Depth-first walk over the dependency map; the cycle is the path slice
    /// from the first occurrence of the revisited id, closed with that id
    fn find_cycle(&self, start: &str) -> Option<Vec<String>> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut path: Vec<&str> = Vec::new();
        self.walk(start, &mut visited, &mut path)
    }

    fn walk<'a>(&'a self, id: &'a str, visited: &mut HashSet<&'a str>, path: &mut Vec<&'a str>) -> Option<Vec<String>> {
        if let Some(pos) = path.iter().position(|p| *p == id) {
            let mut cycle: Vec<String> = path[pos..].iter().map(|s| s.to_string()).collect();
            cycle.push(id.to_string());
            return Some(cycle);
        }
        if !visited.insert(id) {
            return None;
        }

        path.push(id);
        for dep in self.dependencies_of(id) {
            if let Some(cycle) = self.walk(dep, visited, path) {
                return Some(cycle);
            }
        }
        path.pop();
        None
    }
}

/// Order a schema's components and component sets so that `ref` targets come first
pub fn resolve_dependencies(schema: &Schema) -> ResolveResult {
    let graph = DependencyGraph::from_schema(schema);
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        unresolved = graph.unresolved_refs().len(),
        "dependency graph built"
    );

    match graph.topological_order() {
        Ok(order) => ResolveResult {
            success: true,
            order,
            error: None,
        },
        Err(cycle) => {
            let chain = if cycle.is_empty() {
                "unknown".to_string()
            } else {
                cycle.join(" -> ")
            };
            ResolveResult {
                success: false,
                order: Vec::new(),
                error: Some(format!("Circular dependency detected: {}", chain)),
            }
        }
    }
}
