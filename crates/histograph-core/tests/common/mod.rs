use chrono::{TimeZone, Utc};
use histograph_core::commit::CommitFactory;
use histograph_core::graph::{DynMetamodel, DynObject, LiveValue, MetamodelGraphFactory};
use histograph_core::model::{CdoSnapshot, GlobalId};
use histograph_core::{
    Commit, CommitId, CommitIdFactory, DiffFactory, ExError, FixedDateProvider,
    InMemoryRepository, Repository, Result,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

pub type TestCommitFactory = CommitFactory<MetamodelGraphFactory<DynMetamodel>>;

/// Person { name, age, boss, tags } and Team { name, members }
#[allow(dead_code)]
pub fn metamodel() -> DynMetamodel {
    DynMetamodel::new()
        .with_type("Person", &["name", "age", "boss", "tags"])
        .with_type("Team", &["name", "members"])
}

/// A person with no boss and no tags
#[allow(dead_code)]
pub fn person(id: &str, name: &str, age: i64) -> DynObject {
    DynObject::new("Person", id)
        .with("name", name)
        .with("age", age)
        .with("boss", LiveValue::Reference(None))
        .with("tags", LiveValue::List(Vec::new()))
}

#[allow(dead_code)]
pub fn no_properties() -> BTreeMap<String, String> {
    BTreeMap::new()
}

/// Commit factory over the given repository, with a fixed clock
#[allow(dead_code)]
pub fn commit_factory(repository: Arc<dyn Repository>) -> TestCommitFactory {
    let head = repository.head_id().unwrap();
    commit_factory_after(repository, head)
}

/// Commit factory numbering commits after `start_after`
#[allow(dead_code)]
pub fn commit_factory_after(
    repository: Arc<dyn Repository>,
    start_after: Option<CommitId>,
) -> TestCommitFactory {
    CommitFactory::new(
        MetamodelGraphFactory::new(metamodel()),
        repository,
        DiffFactory::default(),
        Arc::new(CommitIdFactory::new(start_after)),
        Arc::new(FixedDateProvider::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )),
    )
}

/// Fresh in-memory repository and a factory bound to it
#[allow(dead_code)]
pub fn setup() -> (Arc<InMemoryRepository>, TestCommitFactory) {
    let repository = Arc::new(InMemoryRepository::new());
    let factory = commit_factory(repository.clone());
    (repository, factory)
}

/// Repository whose every read and write fails with the same error
///
/// `head_id` succeeds with no commits, so a factory can still be built on it.
#[allow(dead_code)]
pub struct FailingRepository {
    error: ExError,
}

#[allow(dead_code)]
impl FailingRepository {
    pub fn new(error: ExError) -> Self {
        Self { error }
    }
}

impl Repository for FailingRepository {
    fn get_latest(&self, _id: &GlobalId) -> Result<Option<CdoSnapshot>> {
        Err(self.error.clone())
    }

    fn get_latest_graph(&self, _ids: &BTreeSet<GlobalId>) -> Result<BTreeMap<GlobalId, CdoSnapshot>> {
        Err(self.error.clone())
    }

    fn persist(&self, _commit: &Commit) -> Result<()> {
        Err(self.error.clone())
    }

    fn head_id(&self) -> Result<Option<CommitId>> {
        Ok(None)
    }

    fn get_state_history(&self, _id: &GlobalId, _limit: usize) -> Result<Vec<CdoSnapshot>> {
        Err(self.error.clone())
    }
}
