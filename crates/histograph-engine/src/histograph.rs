//! The `Histograph` facade
//!
//! Every commit that records something is persisted before it is returned.
//! A commit with no changes is returned to the caller but never stored.

#![allow(clippy::result_large_err)]

use std::collections::BTreeMap;
use std::sync::Arc;

use histograph_core::graph::LiveGraphFactory;
use histograph_core::{
    CdoSnapshot, Commit, CommitFactory, CommitFuture, CoreConfiguration, Diff, Executor, GlobalId,
    Metamodel, MetamodelGraphFactory, Repository, Result,
};

/// Versioning facade over one metamodel and one repository
pub struct Histograph<M: Metamodel> {
    commit_factory: CommitFactory<MetamodelGraphFactory<M>>,
    repository: Arc<dyn Repository>,
    configuration: CoreConfiguration,
}

fn persist_if_changed(repository: &dyn Repository, commit: Commit) -> Result<Commit> {
    if commit.is_empty() {
        tracing::debug!(commit_id = %commit.id(), "Nothing changed, commit not persisted");
        return Ok(commit);
    }
    repository.persist(&commit)?;
    Ok(commit)
}

impl<M: Metamodel> Histograph<M> {
    pub(crate) fn new(
        commit_factory: CommitFactory<MetamodelGraphFactory<M>>,
        repository: Arc<dyn Repository>,
        configuration: CoreConfiguration,
    ) -> Self {
        Self {
            commit_factory,
            repository,
            configuration,
        }
    }

    pub fn repository(&self) -> &Arc<dyn Repository> {
        &self.repository
    }

    pub fn configuration(&self) -> &CoreConfiguration {
        &self.configuration
    }

    pub fn metamodel(&self) -> &M {
        self.commit_factory.live_graph_factory().metamodel()
    }

    /// Record the current state of the graph reachable from `root`
    ///
    /// # Errors
    ///
    /// Commit pipeline and repository errors; nothing is stored on failure.
    pub fn commit(&self, author: &str, root: &M::Object) -> Result<Commit> {
        self.commit_with_properties(author, BTreeMap::new(), root)
    }

    /// [`Histograph::commit`] with caller-supplied commit tags
    ///
    /// # Errors
    ///
    /// As [`Histograph::commit`].
    pub fn commit_with_properties(
        &self,
        author: &str,
        properties: BTreeMap<String, String>,
        root: &M::Object,
    ) -> Result<Commit> {
        let commit = self.commit_factory.create(author, properties, root)?;
        persist_if_changed(self.repository.as_ref(), commit)
    }

    /// Commit on `executor`
    ///
    /// The graph is captured before this returns; diffing and persistence run
    /// in the executor task.
    ///
    /// # Errors
    ///
    /// Validation and graph capture errors immediately, everything else
    /// through the future.
    pub fn commit_async<E>(
        &self,
        author: &str,
        properties: BTreeMap<String, String>,
        root: &M::Object,
        executor: &E,
    ) -> Result<CommitFuture>
    where
        E: Executor + ?Sized,
    {
        let repository = Arc::clone(&self.repository);
        self.commit_factory
            .create_async_with(author, properties, root, executor, move |commit| {
                persist_if_changed(repository.as_ref(), commit)
            })
    }

    /// Record the deletion of `object`; referenced objects are untouched
    ///
    /// # Errors
    ///
    /// `ObjectNotFound` if the object has no live recorded state, identity
    /// and repository errors.
    pub fn commit_shallow_delete(
        &self,
        author: &str,
        properties: BTreeMap<String, String>,
        object: &M::Object,
    ) -> Result<Commit> {
        let commit = self
            .commit_factory
            .create_terminal(author, properties, object)?;
        self.repository.persist(&commit)?;
        Ok(commit)
    }

    /// Record the deletion of the object identified by `global_id`
    ///
    /// # Errors
    ///
    /// As [`Histograph::commit_shallow_delete`].
    pub fn commit_shallow_delete_by_id(
        &self,
        author: &str,
        properties: BTreeMap<String, String>,
        global_id: &GlobalId,
    ) -> Result<Commit> {
        let commit = self
            .commit_factory
            .create_terminal_by_global_id(author, properties, global_id)?;
        self.repository.persist(&commit)?;
        Ok(commit)
    }

    /// Diff two live graphs without consulting or touching the repository
    ///
    /// # Errors
    ///
    /// Graph capture errors from either root.
    pub fn compare(&self, old_root: &M::Object, new_root: &M::Object) -> Result<Diff> {
        let factory = self.commit_factory.live_graph_factory();
        let old = factory.create_live_graph(old_root)?;
        let new = factory.create_live_graph(new_root)?;
        Ok(self.commit_factory.diff_factory().create(&old, &new, None))
    }

    /// Latest recorded snapshot, TERMINAL included
    ///
    /// # Errors
    ///
    /// Repository errors.
    pub fn get_latest_snapshot(&self, global_id: &GlobalId) -> Result<Option<CdoSnapshot>> {
        self.repository.get_latest(global_id)
    }

    /// Up to `limit` snapshots of `global_id`, newest first
    ///
    /// # Errors
    ///
    /// Repository errors.
    pub fn get_state_history(&self, global_id: &GlobalId, limit: usize) -> Result<Vec<CdoSnapshot>> {
        self.repository.get_state_history(global_id, limit)
    }
}
