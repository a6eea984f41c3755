use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::commit::Commit;
use crate::errors::{ExError, ExErrorKind, Result};
use crate::model::{CdoSnapshot, CommitId, GlobalId};
use crate::repository::Repository;

#[derive(Debug, Default)]
struct Store {
    // per object, oldest first
    snapshots: BTreeMap<GlobalId, Vec<CdoSnapshot>>,
    head: Option<CommitId>,
    commit_count: usize,
}

/// Process-local repository
///
/// Rejects a commit whose snapshot versions do not continue the stored
/// history, leaving the store untouched.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

fn poisoned<T>(op: &'static str) -> impl FnOnce(PoisonError<T>) -> ExError {
    move |_| {
        ExError::new(ExErrorKind::Concurrency)
            .with_op(op)
            .with_message("repository lock poisoned")
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted commits
    pub fn commit_count(&self) -> Result<usize> {
        Ok(self.read("commit_count")?.commit_count)
    }

    fn read(&self, op: &'static str) -> Result<RwLockReadGuard<'_, Store>> {
        self.store.read().map_err(poisoned(op))
    }

    fn write(&self, op: &'static str) -> Result<RwLockWriteGuard<'_, Store>> {
        self.store.write().map_err(poisoned(op))
    }
}

impl Repository for InMemoryRepository {
    fn get_latest(&self, id: &GlobalId) -> Result<Option<CdoSnapshot>> {
        let store = self.read("get_latest")?;
        Ok(store.snapshots.get(id).and_then(|h| h.last()).cloned())
    }

    fn get_latest_graph(&self, ids: &BTreeSet<GlobalId>) -> Result<BTreeMap<GlobalId, CdoSnapshot>> {
        let store = self.read("get_latest_graph")?;
        Ok(ids
            .iter()
            .filter_map(|id| {
                let latest = store.snapshots.get(id)?.last()?;
                Some((id.clone(), latest.clone()))
            })
            .collect())
    }

    fn persist(&self, commit: &Commit) -> Result<()> {
        let mut store = self.write("persist")?;

        let mut expected: BTreeMap<&GlobalId, u64> = BTreeMap::new();
        for snapshot in commit.snapshots() {
            let id = snapshot.global_id();
            let latest = match expected.get(id) {
                Some(v) => *v,
                None => store
                    .snapshots
                    .get(id)
                    .and_then(|h| h.last())
                    .map_or(0, CdoSnapshot::version),
            };
            if snapshot.version() <= latest {
                return Err(ExError::new(ExErrorKind::Persistence)
                    .with_op("persist")
                    .with_entity_id(id.value())
                    .with_message(format!(
                        "snapshot version {} does not follow stored version {}",
                        snapshot.version(),
                        latest
                    )));
            }
            expected.insert(id, snapshot.version());
        }

        for snapshot in commit.snapshots() {
            store
                .snapshots
                .entry(snapshot.global_id().clone())
                .or_default()
                .push(snapshot.clone());
        }
        store.head = store.head.max(Some(commit.id()));
        store.commit_count += 1;
        Ok(())
    }

    fn head_id(&self) -> Result<Option<CommitId>> {
        Ok(self.read("head_id")?.head)
    }

    fn get_state_history(&self, id: &GlobalId, limit: usize) -> Result<Vec<CdoSnapshot>> {
        let store = self.read("get_state_history")?;
        Ok(store
            .snapshots
            .get(id)
            .map(|h| h.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}
