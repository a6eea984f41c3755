//! Diff factory: runs the change appenders across two object graphs.

use std::sync::Arc;

use crate::diff::appenders::{self, object, ListDiffPolicy};
use crate::diff::model::Diff;
use crate::graph::ObjectGraph;
use crate::model::{CommitMetadata, GlobalId, GraphNode};

#[derive(Debug, Clone, Default)]
pub struct DiffFactory {
    policy: ListDiffPolicy,
}

impl DiffFactory {
    pub fn new(policy: ListDiffPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ListDiffPolicy {
        &self.policy
    }

    /// Compare `previous` against `current`
    ///
    /// Objects are visited in `current`'s traversal order, properties in the
    /// current object's declaration order. An object missing from `previous`
    /// gets a single `NewObject` change. Objects only in `previous` produce
    /// nothing: deletions are recorded through [`DiffFactory::single_terminal`].
    pub fn create<P, C>(
        &self,
        previous: &ObjectGraph<P>,
        current: &ObjectGraph<C>,
        commit_metadata: Option<Arc<CommitMetadata>>,
    ) -> Diff
    where
        P: GraphNode,
        C: GraphNode,
    {
        let mut changes = Vec::new();

        for node in current.traverse() {
            let id = node.global_id();
            let Some(prev) = previous.node(id) else {
                changes.push(object::new_object(id));
                continue;
            };
            for (property, value) in node.state().iter() {
                let before = prev.state().get(property);
                if let Some(change) = appenders::detect(id, property, before, value, &self.policy) {
                    changes.push(change);
                }
            }
        }

        Diff::new(changes, commit_metadata)
    }

    /// Diff holding exactly one `ObjectRemoved` change
    pub fn single_terminal(&self, global_id: &GlobalId, commit_metadata: Arc<CommitMetadata>) -> Diff {
        Diff::new(vec![object::object_removed(global_id)], Some(commit_metadata))
    }
}
