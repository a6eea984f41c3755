use std::sync::Arc;

use crate::model::{CdoSnapshot, CommitMetadata, GraphNode, SnapshotType};

/// Builds snapshots; the only place a [`CdoSnapshot`] is constructed
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotFactory;

impl SnapshotFactory {
    pub fn new() -> Self {
        Self
    }

    /// First snapshot of an object; every property counts as changed
    ///
    /// `version` is 1 unless the object was deleted earlier and is being
    /// recorded again.
    pub fn create_initial<N: GraphNode>(
        &self,
        node: &N,
        version: u64,
        commit_metadata: Arc<CommitMetadata>,
    ) -> CdoSnapshot {
        let changed = node.state().property_names().map(String::from).collect();
        CdoSnapshot::new(
            node.global_id().clone(),
            node.state().clone(),
            SnapshotType::Initial,
            version,
            commit_metadata,
            changed,
        )
    }

    pub fn create_update<N: GraphNode>(
        &self,
        node: &N,
        previous: &CdoSnapshot,
        changed_properties: Vec<String>,
        commit_metadata: Arc<CommitMetadata>,
    ) -> CdoSnapshot {
        CdoSnapshot::new(
            node.global_id().clone(),
            node.state().clone(),
            SnapshotType::Update,
            previous.version().saturating_add(1),
            commit_metadata,
            changed_properties,
        )
    }

    /// Deletion marker carrying the last known state
    pub fn create_terminal(
        &self,
        previous: &CdoSnapshot,
        commit_metadata: Arc<CommitMetadata>,
    ) -> CdoSnapshot {
        CdoSnapshot::new(
            previous.global_id().clone(),
            previous.state().clone(),
            SnapshotType::Terminal,
            previous.version().saturating_add(1),
            commit_metadata,
            Vec::new(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cdo, CdoState, CommitId, GlobalId};
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn metadata(major: u64) -> Arc<CommitMetadata> {
        Arc::new(CommitMetadata::new(
            "author",
            BTreeMap::new(),
            Utc::now(),
            CommitId::new(major, 0),
        ))
    }

    #[test]
    fn test_lifecycle_versions() {
        let factory = SnapshotFactory::new();
        let cdo = Cdo::new(
            GlobalId::new("Person", "1"),
            CdoState::new().with("name", "Bob").with("age", 42),
        );

        let initial = factory.create_initial(&cdo, 1, metadata(1));
        assert!(initial.is_initial());
        assert_eq!(initial.version(), 1);
        assert_eq!(initial.changed_properties(), &["name", "age"]);

        let update = factory.create_update(&cdo, &initial, vec!["age".to_string()], metadata(2));
        assert_eq!(update.snapshot_type(), SnapshotType::Update);
        assert_eq!(update.version(), 2);

        let terminal = factory.create_terminal(&update, metadata(3));
        assert!(terminal.is_terminal());
        assert_eq!(terminal.version(), 3);
        assert_eq!(terminal.state(), update.state());
        assert_eq!(terminal.commit_metadata().id(), CommitId::new(3, 0));
    }
}
