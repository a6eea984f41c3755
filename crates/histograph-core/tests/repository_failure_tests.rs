//! Repository Failure Tests
//!
//! A failing repository surfaces its own error through every commit
//! operation. The factory only adds the operation name (when the repository
//! left it unset) and the request id.
//!
//! ## Scenarios Covered
//!
//! 1. `create` keeps the repository's kind, message, entity and operation
//! 2. `create_terminal_by_global_id` names itself when the repository did not
//! 3. An asynchronous commit fails through its future
//! 4. No commit id is spent on a failed read

mod common;

use common::{commit_factory, metamodel, no_properties, person, FailingRepository};
use histograph_core::commit::{InlineExecutor, ThreadExecutor};
use histograph_core::{
    CommitFactory, CommitIdFactory, DiffFactory, ExError, ExErrorKind, GlobalId,
    MetamodelGraphFactory, SystemDateProvider,
};
use std::sync::Arc;

fn disk_unavailable() -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("load_latest")
        .with_entity_id("Person/bob")
        .with_message("disk unavailable")
}

#[test]
fn test_create_surfaces_repository_error() {
    // GIVEN a repository whose reads fail
    let factory = commit_factory(Arc::new(FailingRepository::new(disk_unavailable())));

    // WHEN a commit is created
    let err = factory
        .create("alice", no_properties(), &person("bob", "Bob", 42))
        .unwrap_err();

    // THEN the repository's error comes back, tagged with the request
    assert_eq!(err.kind(), ExErrorKind::Persistence);
    assert_eq!(err.message(), "disk unavailable");
    assert_eq!(err.entity_id(), Some("Person/bob"));
    assert_eq!(err.op(), Some("load_latest"));
    assert!(err.request_id().is_some());
}

#[test]
fn test_terminal_by_global_id_surfaces_repository_error() {
    // GIVEN a repository error without an operation
    let error = ExError::new(ExErrorKind::Persistence).with_message("disk unavailable");
    let factory = commit_factory(Arc::new(FailingRepository::new(error)));

    // WHEN a deletion is recorded by id
    let err = factory
        .create_terminal_by_global_id("alice", no_properties(), &GlobalId::new("Person", "bob"))
        .unwrap_err();

    // THEN the kind and message are kept and the factory names the operation
    assert_eq!(err.kind(), ExErrorKind::Persistence);
    assert_eq!(err.message(), "disk unavailable");
    assert_eq!(err.op(), Some("create_terminal_by_global_id"));
    assert!(err.request_id().is_some());
}

#[test]
fn test_async_commit_fails_through_future() {
    let factory = commit_factory(Arc::new(FailingRepository::new(disk_unavailable())));

    // graph capture needs no repository, so the call itself succeeds
    let future = factory
        .create_async("alice", no_properties(), &person("bob", "Bob", 42), &ThreadExecutor)
        .unwrap();
    let err = future.wait().unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Persistence);
    assert_eq!(err.message(), "disk unavailable");
    assert_eq!(err.op(), Some("load_latest"));
    assert!(err.request_id().is_some());
}

#[test]
fn test_failed_read_spends_no_commit_id() {
    // GIVEN a factory whose id allocator the test can inspect
    let error = ExError::new(ExErrorKind::Persistence).with_message("disk unavailable");
    let ids = Arc::new(CommitIdFactory::new(None));
    let factory = CommitFactory::new(
        MetamodelGraphFactory::new(metamodel()),
        Arc::new(FailingRepository::new(error)),
        DiffFactory::default(),
        Arc::clone(&ids),
        Arc::new(SystemDateProvider),
    );

    // WHEN several inline asynchronous commits fail on the repository read
    for _ in 0..3 {
        let err = factory
            .create_async("alice", no_properties(), &person("bob", "Bob", 42), &InlineExecutor)
            .unwrap()
            .wait()
            .unwrap_err();
        assert_eq!(err.op(), Some("create_commit_async"));
    }

    // THEN numbering has not moved
    assert_eq!(ids.last_id(), None);
}
