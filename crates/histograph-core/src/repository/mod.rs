//! Repository boundary: durable storage of commits and snapshots.

pub mod memory;

pub use memory::InMemoryRepository;

use std::collections::{BTreeMap, BTreeSet};

use crate::commit::Commit;
use crate::errors::Result;
use crate::model::{CdoSnapshot, CommitId, GlobalId};

/// Storage consumed by the commit pipeline
///
/// Implementations must be shareable between threads; failures are reported
/// as `ExError` and propagated by the core unchanged.
pub trait Repository: Send + Sync {
    /// Most recent snapshot of `id`, which may be TERMINAL
    fn get_latest(&self, id: &GlobalId) -> Result<Option<CdoSnapshot>>;

    /// Most recent snapshot for each known id; unknown ids are left out
    fn get_latest_graph(&self, ids: &BTreeSet<GlobalId>) -> Result<BTreeMap<GlobalId, CdoSnapshot>> {
        let mut latest = BTreeMap::new();
        for id in ids {
            if let Some(snapshot) = self.get_latest(id)? {
                latest.insert(id.clone(), snapshot);
            }
        }
        Ok(latest)
    }

    /// Durably append a commit and all its snapshots
    fn persist(&self, commit: &Commit) -> Result<()>;

    /// Highest commit id persisted so far
    fn head_id(&self) -> Result<Option<CommitId>>;

    /// Snapshots of `id`, newest first, at most `limit` of them
    fn get_state_history(&self, id: &GlobalId, limit: usize) -> Result<Vec<CdoSnapshot>>;
}
