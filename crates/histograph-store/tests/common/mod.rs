use chrono::{TimeZone, Utc};
use histograph_core::commit::CommitFactory;
use histograph_core::graph::{DynMetamodel, DynObject, LiveValue, MetamodelGraphFactory};
use histograph_core::{CommitIdFactory, DiffFactory, FixedDateProvider, Repository};
use histograph_store::SqliteRepository;
use std::collections::BTreeMap;
use std::sync::Arc;

pub type TestCommitFactory = CommitFactory<MetamodelGraphFactory<DynMetamodel>>;

/// Person { name, age, boss } only
#[allow(dead_code)]
pub fn person(id: &str, name: &str, age: i64) -> DynObject {
    DynObject::new("Person", id)
        .with("name", name)
        .with("age", age)
        .with("boss", LiveValue::Reference(None))
}

#[allow(dead_code)]
pub fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Commit factory continuing after the repository's head
#[allow(dead_code)]
pub fn commit_factory(repository: Arc<dyn Repository>) -> TestCommitFactory {
    let head = repository.head_id().unwrap();
    CommitFactory::new(
        MetamodelGraphFactory::new(DynMetamodel::new().with_type("Person", &["name", "age", "boss"])),
        repository,
        DiffFactory::default(),
        Arc::new(CommitIdFactory::new(head)),
        Arc::new(FixedDateProvider::new(
            Utc.with_ymd_and_hms(2024, 3, 15, 12, 30, 0).unwrap(),
        )),
    )
}

#[allow(dead_code)]
pub fn setup() -> (Arc<SqliteRepository>, TestCommitFactory) {
    let repository = Arc::new(SqliteRepository::open_in_memory().unwrap());
    let factory = commit_factory(repository.clone());
    (repository, factory)
}
