//! Commit factory: the top-level orchestrator of the commit pipeline.
//!
//! Regular commits go through
//! `Received -> GraphBuilt -> DiffComputed -> SnapshotsBuilt -> Assembled`;
//! terminal commits through
//! `Received -> IdentityResolved -> PreviousSnapshotFetched -> TerminalSnapshotBuilt -> Assembled`.
//! A failure at any step discards everything built so far.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use futures::channel::oneshot;
use histograph_core_types::{RequestId, Sensitive};

use crate::commit::executor::{CommitFuture, Executor};
use crate::commit::id_factory::CommitIdFactory;
use crate::commit::model::Commit;
use crate::date::DateProvider;
use crate::diff::DiffFactory;
use crate::errors::{ExError, HistographError, Result};
use crate::graph::{LiveGraph, LiveGraphFactory};
use crate::model::{CommitMetadata, GlobalId};
use crate::repository::Repository;
use crate::snapshot::{ChangedSnapshotsFactory, SnapshotFactory, SnapshotGraphFactory};
use crate::{log_op_end, log_op_error, log_op_start};

/// Everything after live graph capture; shared with asynchronous tasks
struct Pipeline {
    repository: Arc<dyn Repository>,
    snapshot_graph_factory: SnapshotGraphFactory,
    diff_factory: DiffFactory,
    changed_snapshots_factory: ChangedSnapshotsFactory,
    snapshot_factory: SnapshotFactory,
    commit_id_factory: Arc<CommitIdFactory>,
    date_provider: Arc<dyn DateProvider>,
}

impl Pipeline {
    /// Allocates the commit id; called only after the live graph exists
    fn metadata(&self, author: &str, properties: BTreeMap<String, String>) -> Result<Arc<CommitMetadata>> {
        let id = self.commit_id_factory.next_id()?;
        Ok(Arc::new(CommitMetadata::new(
            author,
            properties,
            self.date_provider.now(),
            id,
        )))
    }

    fn assemble(
        &self,
        author: &str,
        properties: BTreeMap<String, String>,
        live: LiveGraph,
    ) -> Result<Commit> {
        let latest = self
            .snapshot_graph_factory
            .create_latest(&live.global_ids())?;
        let metadata = self.metadata(author, properties)?;
        let diff = self
            .diff_factory
            .create(latest.graph(), &live, Some(Arc::clone(&metadata)));
        let snapshots = self
            .changed_snapshots_factory
            .create(&live, &latest, &diff, &metadata);
        Ok(Commit::new(metadata, snapshots, diff))
    }

    fn assemble_terminal(
        &self,
        author: &str,
        properties: BTreeMap<String, String>,
        global_id: &GlobalId,
    ) -> Result<Commit> {
        let previous = match self.repository.get_latest(global_id)? {
            Some(snapshot) if !snapshot.is_terminal() => snapshot,
            _ => {
                return Err(HistographError::ObjectNotFound {
                    global_id: global_id.value(),
                }
                .into())
            }
        };
        let metadata = self.metadata(author, properties)?;
        let terminal = self
            .snapshot_factory
            .create_terminal(&previous, Arc::clone(&metadata));
        let diff = self
            .diff_factory
            .single_terminal(global_id, Arc::clone(&metadata));
        Ok(Commit::new(metadata, vec![terminal], diff))
    }
}

/// Builds commits from live objects
///
/// Shared across concurrent callers; the only synchronization point is the
/// commit id allocation.
pub struct CommitFactory<L> {
    live_graph_factory: L,
    pipeline: Arc<Pipeline>,
}

impl<L: LiveGraphFactory> CommitFactory<L> {
    pub fn new(
        live_graph_factory: L,
        repository: Arc<dyn Repository>,
        diff_factory: DiffFactory,
        commit_id_factory: Arc<CommitIdFactory>,
        date_provider: Arc<dyn DateProvider>,
    ) -> Self {
        let snapshot_factory = SnapshotFactory::new();
        Self {
            live_graph_factory,
            pipeline: Arc::new(Pipeline {
                snapshot_graph_factory: SnapshotGraphFactory::new(Arc::clone(&repository)),
                repository,
                diff_factory,
                changed_snapshots_factory: ChangedSnapshotsFactory::new(snapshot_factory),
                snapshot_factory,
                commit_id_factory,
                date_provider,
            }),
        }
    }

    pub fn live_graph_factory(&self) -> &L {
        &self.live_graph_factory
    }

    pub fn diff_factory(&self) -> &DiffFactory {
        &self.pipeline.diff_factory
    }

    /// Commit the current state of the graph reachable from `root`
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty author, before any graph work
    /// - `GraphBuild`, `Identity`, `NoIdentityMapping` from the live graph builder
    /// - repository failures, unchanged
    /// - `CommitIdExhausted`
    pub fn create(
        &self,
        author: &str,
        properties: BTreeMap<String, String>,
        root: &L::Object,
    ) -> Result<Commit> {
        const OP: &str = "create_commit";
        let request_id = RequestId::new();
        let span = tracing::info_span!("create_commit", request_id = %request_id);
        let _enter = span.enter();
        let start = Instant::now();
        log_op_start!(OP, properties = ?Sensitive::new(&properties));

        let result = validate_author(author)
            .and_then(|_| self.live_graph_factory.create_live_graph(root))
            .and_then(|live| self.pipeline.assemble(author, properties, live));
        finish(OP, request_id, start, result)
    }

    /// Asynchronous [`CommitFactory::create`]
    ///
    /// The live graph is captured on the calling thread before this returns;
    /// later mutations of `root` are not part of the commit. Diffing, snapshot
    /// building and assembly run on `executor`.
    ///
    /// # Errors
    ///
    /// Validation and graph capture errors are returned immediately. Later
    /// failures, and a task the executor dropped (`TaskCancelled`), surface
    /// through the future.
    pub fn create_async<E>(
        &self,
        author: &str,
        properties: BTreeMap<String, String>,
        root: &L::Object,
        executor: &E,
    ) -> Result<CommitFuture>
    where
        E: Executor + ?Sized,
    {
        self.create_async_with(author, properties, root, executor, Ok)
    }

    /// [`CommitFactory::create_async`] with a step run on the executor right
    /// after assembly, before the future resolves
    ///
    /// An error from `then` fails the commit like any pipeline error.
    ///
    /// # Errors
    ///
    /// As [`CommitFactory::create_async`].
    pub fn create_async_with<E, F>(
        &self,
        author: &str,
        properties: BTreeMap<String, String>,
        root: &L::Object,
        executor: &E,
        then: F,
    ) -> Result<CommitFuture>
    where
        E: Executor + ?Sized,
        F: FnOnce(Commit) -> Result<Commit> + Send + 'static,
    {
        const OP: &str = "create_commit_async";
        let request_id = RequestId::new();
        let span = tracing::info_span!("create_commit_async", request_id = %request_id);
        let start = Instant::now();

        let live = {
            let _enter = span.enter();
            log_op_start!(OP, properties = ?Sensitive::new(&properties));
            match validate_author(author).and_then(|_| self.live_graph_factory.create_live_graph(root)) {
                Ok(live) => live,
                Err(e) => {
                    let err = annotate(e, OP, &request_id);
                    log_op_error!(OP, err, duration_ms = elapsed_ms(start));
                    return Err(err);
                }
            }
        };

        let (sender, receiver) = oneshot::channel();
        let pipeline = Arc::clone(&self.pipeline);
        let author = author.to_string();
        executor.execute(Box::new(move || {
            let _enter = span.enter();
            let result = pipeline.assemble(&author, properties, live).and_then(then);
            let result = finish(OP, request_id, start, result);
            // the receiver may be gone; the commit is still returned to nobody
            let _ = sender.send(result);
        }));

        Ok(CommitFuture::new(receiver))
    }

    /// Record the deletion of `removed`
    ///
    /// # Errors
    ///
    /// As [`CommitFactory::create_terminal_by_global_id`], plus identity
    /// resolution errors.
    pub fn create_terminal(
        &self,
        author: &str,
        properties: BTreeMap<String, String>,
        removed: &L::Object,
    ) -> Result<Commit> {
        const OP: &str = "create_terminal";
        let request_id = RequestId::new();
        let span = tracing::info_span!("create_terminal", request_id = %request_id);
        let _enter = span.enter();
        let start = Instant::now();
        log_op_start!(OP, properties = ?Sensitive::new(&properties));

        let result = validate_author(author)
            .and_then(|_| self.live_graph_factory.identity_of(removed))
            .and_then(|id| self.pipeline.assemble_terminal(author, properties, &id));
        finish(OP, request_id, start, result)
    }

    /// Record the deletion of the object identified by `global_id`
    ///
    /// # Errors
    ///
    /// `ObjectNotFound` when the object has no recorded state, or is already
    /// deleted. Nothing is allocated or built in that case.
    pub fn create_terminal_by_global_id(
        &self,
        author: &str,
        properties: BTreeMap<String, String>,
        global_id: &GlobalId,
    ) -> Result<Commit> {
        const OP: &str = "create_terminal_by_global_id";
        let request_id = RequestId::new();
        let span = tracing::info_span!(
            "create_terminal_by_global_id",
            request_id = %request_id,
            global_id = %global_id
        );
        let _enter = span.enter();
        let start = Instant::now();
        log_op_start!(OP, properties = ?Sensitive::new(&properties));

        let result = validate_author(author)
            .and_then(|_| self.pipeline.assemble_terminal(author, properties, global_id));
        finish(OP, request_id, start, result)
    }
}

fn validate_author(author: &str) -> Result<()> {
    if author.trim().is_empty() {
        return Err(HistographError::InvalidArgument {
            reason: "author must not be empty".to_string(),
        }
        .into());
    }
    Ok(())
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Attach operation context, keeping an operation set closer to the failure
fn annotate(err: ExError, op: &str, request_id: &RequestId) -> ExError {
    let err = if err.op().is_none() { err.with_op(op) } else { err };
    err.with_request_id(request_id.clone())
}

fn finish(op: &str, request_id: RequestId, start: Instant, result: Result<Commit>) -> Result<Commit> {
    match result {
        Ok(commit) => {
            log_op_end!(
                op,
                duration_ms = elapsed_ms(start),
                commit_id = %commit.id(),
                snapshot_count = commit.snapshots().len(),
                change_count = commit.diff().len()
            );
            Ok(commit)
        }
        Err(e) => {
            let err = annotate(e, op, &request_id);
            log_op_error!(op, err, duration_ms = elapsed_ms(start));
            Err(err)
        }
    }
}
