use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::errors::Result;
use crate::graph::ObjectGraph;
use crate::model::{CdoSnapshot, GlobalId};
use crate::repository::Repository;

/// Latest recorded state for a set of identities
///
/// Objects whose latest snapshot is TERMINAL are not part of the graph; they
/// are treated as new, but keep counting versions from the deletion.
#[derive(Debug, Clone)]
pub struct LatestSnapshots {
    graph: ObjectGraph<CdoSnapshot>,
    terminal_versions: BTreeMap<GlobalId, u64>,
}

impl LatestSnapshots {
    pub fn empty() -> Self {
        Self {
            graph: ObjectGraph::empty(),
            terminal_versions: BTreeMap::new(),
        }
    }

    pub fn graph(&self) -> &ObjectGraph<CdoSnapshot> {
        &self.graph
    }

    /// Version of the terminal snapshot, if the object was deleted
    pub fn terminal_version(&self, id: &GlobalId) -> Option<u64> {
        self.terminal_versions.get(id).copied()
    }

    /// Version the next snapshot of `id` must carry
    pub fn next_version(&self, id: &GlobalId) -> u64 {
        let latest = self
            .graph
            .node(id)
            .map(CdoSnapshot::version)
            .or_else(|| self.terminal_version(id))
            .unwrap_or(0);
        latest.saturating_add(1)
    }
}

/// Assembles the latest persisted snapshots into an object graph
pub struct SnapshotGraphFactory {
    repository: Arc<dyn Repository>,
}

impl SnapshotGraphFactory {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    /// Latest snapshots for `ids`; unknown ids are simply absent
    ///
    /// # Errors
    ///
    /// Repository failures, unchanged.
    pub fn create_latest(&self, ids: &BTreeSet<GlobalId>) -> Result<LatestSnapshots> {
        if ids.is_empty() {
            return Ok(LatestSnapshots::empty());
        }

        let latest = self.repository.get_latest_graph(ids)?;
        let mut terminal_versions = BTreeMap::new();
        let mut live = Vec::with_capacity(latest.len());
        for (id, snapshot) in latest {
            if snapshot.is_terminal() {
                terminal_versions.insert(id, snapshot.version());
            } else {
                live.push(snapshot);
            }
        }

        tracing::debug!(
            requested = ids.len(),
            found = live.len(),
            terminal = terminal_versions.len(),
            "Loaded latest snapshots"
        );
        Ok(LatestSnapshots {
            graph: ObjectGraph::from_nodes(None, live)?,
            terminal_versions,
        })
    }
}
