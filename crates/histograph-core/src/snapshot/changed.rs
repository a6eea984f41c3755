use std::sync::Arc;

use crate::diff::Diff;
use crate::graph::LiveGraph;
use crate::model::{CdoSnapshot, CommitMetadata};
use crate::snapshot::factory::SnapshotFactory;
use crate::snapshot::graph_factory::LatestSnapshots;

/// Decides which live objects need a new snapshot, and builds them
#[derive(Debug, Clone, Default)]
pub struct ChangedSnapshotsFactory {
    snapshot_factory: SnapshotFactory,
}

impl ChangedSnapshotsFactory {
    pub fn new(snapshot_factory: SnapshotFactory) -> Self {
        Self { snapshot_factory }
    }

    /// Snapshots for every changed object, in live graph traversal order
    ///
    /// An object is changed when the diff holds at least one change for it,
    /// or when it has no previous snapshot. Unchanged objects get nothing.
    pub fn create(
        &self,
        live: &LiveGraph,
        latest: &LatestSnapshots,
        diff: &Diff,
        commit_metadata: &Arc<CommitMetadata>,
    ) -> Vec<CdoSnapshot> {
        let mut snapshots = Vec::new();
        let changed_properties = diff.changed_properties();

        for cdo in live.cdos() {
            let id = cdo.global_id();
            match latest.graph().node(id) {
                None => snapshots.push(self.snapshot_factory.create_initial(
                    cdo,
                    latest.next_version(id),
                    Arc::clone(commit_metadata),
                )),
                Some(previous) => {
                    let changed = match changed_properties.get(id) {
                        Some(properties) if !properties.is_empty() => properties,
                        _ => continue,
                    };
                    snapshots.push(self.snapshot_factory.create_update(
                        cdo,
                        previous,
                        changed.iter().map(|p| p.to_string()).collect(),
                        Arc::clone(commit_metadata),
                    ));
                }
            }
        }

        snapshots
    }
}
