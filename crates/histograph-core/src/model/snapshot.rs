use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::cdo::{CdoState, GraphNode};
use super::commit::CommitMetadata;
use super::global_id::GlobalId;

/// Lifecycle tag of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SnapshotType {
    /// First recorded state of an object
    Initial,
    /// Any later state
    Update,
    /// Object was deleted; carries the last known state
    Terminal,
}

impl SnapshotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotType::Initial => "INITIAL",
            SnapshotType::Update => "UPDATE",
            SnapshotType::Terminal => "TERMINAL",
        }
    }
}

/// Immutable, versioned, full-state capture of an object at commit time
///
/// Built by [`SnapshotFactory`](crate::snapshot::SnapshotFactory), or restored by a
/// repository; never mutated afterwards. A newer capture of the same object is a
/// new snapshot with `version = previous + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdoSnapshot {
    global_id: GlobalId,
    state: CdoState,
    snapshot_type: SnapshotType,
    version: u64,
    commit_metadata: Arc<CommitMetadata>,
    changed_properties: Vec<String>,
}

impl CdoSnapshot {
    pub(crate) fn new(
        global_id: GlobalId,
        state: CdoState,
        snapshot_type: SnapshotType,
        version: u64,
        commit_metadata: Arc<CommitMetadata>,
        changed_properties: Vec<String>,
    ) -> Self {
        Self {
            global_id,
            state,
            snapshot_type,
            version,
            commit_metadata,
            changed_properties,
        }
    }

    /// Rebuild a snapshot read back from a repository
    pub fn restore(
        global_id: GlobalId,
        state: CdoState,
        snapshot_type: SnapshotType,
        version: u64,
        commit_metadata: Arc<CommitMetadata>,
        changed_properties: Vec<String>,
    ) -> Self {
        Self::new(
            global_id,
            state,
            snapshot_type,
            version,
            commit_metadata,
            changed_properties,
        )
    }

    pub fn global_id(&self) -> &GlobalId {
        &self.global_id
    }

    pub fn state(&self) -> &CdoState {
        &self.state
    }

    pub fn snapshot_type(&self) -> SnapshotType {
        self.snapshot_type
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn commit_metadata(&self) -> &Arc<CommitMetadata> {
        &self.commit_metadata
    }

    /// Names of the properties that changed in the producing commit
    pub fn changed_properties(&self) -> &[String] {
        &self.changed_properties
    }

    pub fn is_initial(&self) -> bool {
        self.snapshot_type == SnapshotType::Initial
    }

    pub fn is_terminal(&self) -> bool {
        self.snapshot_type == SnapshotType::Terminal
    }
}

impl GraphNode for CdoSnapshot {
    fn global_id(&self) -> &GlobalId {
        &self.global_id
    }

    fn state(&self) -> &CdoState {
        &self.state
    }
}
