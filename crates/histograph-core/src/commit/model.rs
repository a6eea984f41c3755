use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::diff::Diff;
use crate::model::{CdoSnapshot, CommitId, CommitMetadata};

/// Metadata, the snapshots of changed objects, and the diff that justified them
///
/// Every snapshot and the diff share the same [`CommitMetadata`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    metadata: Arc<CommitMetadata>,
    snapshots: Vec<CdoSnapshot>,
    diff: Diff,
}

impl Commit {
    pub(crate) fn new(metadata: Arc<CommitMetadata>, snapshots: Vec<CdoSnapshot>, diff: Diff) -> Self {
        Self {
            metadata,
            snapshots,
            diff,
        }
    }

    pub fn id(&self) -> CommitId {
        self.metadata.id()
    }

    pub fn author(&self) -> &str {
        self.metadata.author()
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        self.metadata.properties()
    }

    pub fn commit_date(&self) -> DateTime<Utc> {
        self.metadata.commit_date()
    }

    pub fn metadata(&self) -> &Arc<CommitMetadata> {
        &self.metadata
    }

    pub fn snapshots(&self) -> &[CdoSnapshot] {
        &self.snapshots
    }

    pub fn diff(&self) -> &Diff {
        &self.diff
    }

    /// Nothing changed: no snapshots and an empty diff
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty() && self.diff.is_empty()
    }
}
