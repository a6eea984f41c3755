//! Generic identity-keyed object graph.
//!
//! Nodes are keyed by [`GlobalId`]; edges are the references found in each
//! node's state. Construction is the only mutation point: once built, a graph
//! is read-only and can be shared between readers.

use std::collections::{btree_map, BTreeMap, BTreeSet, HashSet};

use crate::errors::{HistographError, Result};
use crate::model::{Cdo, GlobalId, GraphNode};

/// Object graph over nodes of type `N`
#[derive(Debug, Clone)]
pub struct ObjectGraph<N> {
    nodes: BTreeMap<GlobalId, N>,
    root: Option<GlobalId>,
}

/// Graph of live objects produced by a [`LiveGraphFactory`](super::LiveGraphFactory)
pub type LiveGraph = ObjectGraph<Cdo>;

impl<N: GraphNode> ObjectGraph<N> {
    /// Graph with no nodes
    pub fn empty() -> Self {
        Self {
            nodes: BTreeMap::new(),
            root: None,
        }
    }

    /// Build a graph from nodes, optionally anchored at a root
    ///
    /// # Errors
    ///
    /// `GraphBuildError` if two nodes share a GlobalId, or the root id is not
    /// one of the nodes.
    pub fn from_nodes(root: Option<GlobalId>, nodes: impl IntoIterator<Item = N>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for node in nodes {
            let id = node.global_id().clone();
            if map.contains_key(&id) {
                return Err(HistographError::GraphBuildError {
                    reason: format!("duplicate node {}", id),
                }
                .into());
            }
            map.insert(id, node);
        }
        if let Some(root_id) = &root {
            if !map.contains_key(root_id) {
                return Err(HistographError::GraphBuildError {
                    reason: format!("root {} is not a node of the graph", root_id),
                }
                .into());
            }
        }
        Ok(Self { nodes: map, root })
    }

    /// All identities present
    pub fn node_ids(&self) -> BTreeSet<GlobalId> {
        self.nodes.keys().cloned().collect()
    }

    /// Look up a node; `None` means the id is not part of this graph
    pub fn node(&self, id: &GlobalId) -> Option<&N> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &GlobalId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn root(&self) -> Option<&GlobalId> {
        self.root.as_ref()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in GlobalId order
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.nodes.values()
    }

    /// Depth-first walk visiting every node exactly once
    ///
    /// Starts at the root (if any) and follows references in declaration
    /// order; nodes unreachable from the root follow in GlobalId order.
    /// Safe on cyclic graphs. Each call starts a fresh walk.
    pub fn traverse(&self) -> Traversal<'_, N> {
        Traversal {
            graph: self,
            stack: self.root.iter().collect(),
            visited: HashSet::new(),
            remaining: self.nodes.keys(),
        }
    }

    /// Edges whose target is not a node of this graph, as (source, target)
    ///
    /// These are kept in node state but never traversed.
    pub fn dangling_references(&self) -> Vec<(&GlobalId, &GlobalId)> {
        let mut dangling = Vec::new();
        for (id, node) in &self.nodes {
            for target in node.state().references() {
                if !self.nodes.contains_key(target) {
                    dangling.push((id, target));
                }
            }
        }
        dangling
    }
}

impl LiveGraph {
    /// Identities of every live object in the graph
    pub fn global_ids(&self) -> BTreeSet<GlobalId> {
        self.node_ids()
    }

    /// Live objects in traversal order
    pub fn cdos(&self) -> impl Iterator<Item = &Cdo> {
        self.traverse()
    }
}

/// Iterator returned by [`ObjectGraph::traverse`]
pub struct Traversal<'a, N> {
    graph: &'a ObjectGraph<N>,
    stack: Vec<&'a GlobalId>,
    visited: HashSet<&'a GlobalId>,
    remaining: btree_map::Keys<'a, GlobalId, N>,
}

impl<'a, N: GraphNode> Iterator for Traversal<'a, N> {
    type Item = &'a N;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let id = match self.stack.pop() {
                Some(id) => id,
                None => self
                    .remaining
                    .by_ref()
                    .find(|id| !self.visited.contains(*id))?,
            };

            if self.visited.contains(id) {
                continue;
            }
            // dangling reference
            let Some(node) = self.graph.nodes.get(id) else {
                continue;
            };
            self.visited.insert(id);

            let refs = node.state().references();
            self.stack.extend(refs.into_iter().rev());
            return Some(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;
    use crate::model::{CdoState, PropertyValue};

    fn person(id: &str, refs: &[&str]) -> Cdo {
        let mut state = CdoState::new().with("name", id);
        for (i, r) in refs.iter().enumerate() {
            state.insert(
                format!("ref{}", i),
                PropertyValue::Reference(Some(GlobalId::new("Person", *r))),
            );
        }
        Cdo::new(GlobalId::new("Person", id), state)
    }

    fn ids(graph: &LiveGraph) -> Vec<String> {
        graph
            .traverse()
            .map(|c| c.global_id().local_id().to_string())
            .collect()
    }

    #[test]
    fn test_traverse_cycle_visits_each_node_once() {
        let graph = ObjectGraph::from_nodes(
            Some(GlobalId::new("Person", "a")),
            vec![person("a", &["b"]), person("b", &["c"]), person("c", &["a"])],
        )
        .unwrap();

        assert_eq!(ids(&graph), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_traverse_is_restartable() {
        let graph = ObjectGraph::from_nodes(
            Some(GlobalId::new("Person", "a")),
            vec![person("a", &["b", "a"]), person("b", &[])],
        )
        .unwrap();

        assert_eq!(ids(&graph), ids(&graph));
        assert_eq!(graph.traverse().count(), 2);
    }

    #[test]
    fn test_traverse_follows_declaration_order_then_unreachable() {
        let graph = ObjectGraph::from_nodes(
            Some(GlobalId::new("Person", "root")),
            vec![
                person("root", &["z", "m"]),
                person("z", &[]),
                person("m", &[]),
                person("island", &[]),
            ],
        )
        .unwrap();

        assert_eq!(ids(&graph), vec!["root", "z", "m", "island"]);
    }

    #[test]
    fn test_dangling_reference_recorded_not_traversed() {
        let graph = ObjectGraph::from_nodes(None, vec![person("a", &["ghost"])]).unwrap();

        assert_eq!(ids(&graph), vec!["a"]);
        let dangling = graph.dangling_references();
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].1, &GlobalId::new("Person", "ghost"));
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let err = ObjectGraph::from_nodes(None, vec![person("a", &[]), person("a", &[])]).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::GraphBuild);
    }

    #[test]
    fn test_empty_graph() {
        let graph: LiveGraph = ObjectGraph::empty();
        assert!(graph.is_empty());
        assert_eq!(graph.traverse().count(), 0);
        assert!(graph.global_ids().is_empty());
    }
}
