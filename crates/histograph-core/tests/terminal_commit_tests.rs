//! Terminal Commit Tests
//!
//! Deletion is recorded only through the explicit terminal operations.

mod common;

use common::{no_properties, person, setup};
use histograph_core::{Change, ExErrorKind, GlobalId, PropertyValue, Repository, SnapshotType};

#[test]
fn test_terminal_requires_history() {
    // GIVEN an empty repository
    let (repo, factory) = setup();

    // WHEN deleting an object that was never recorded
    let err = factory
        .create_terminal_by_global_id("alice", no_properties(), &GlobalId::new("Person", "ghost"))
        .unwrap_err();

    // THEN ObjectNotFound is reported and nothing is stored
    assert_eq!(err.kind(), ExErrorKind::ObjectNotFound);
    assert_eq!(err.entity_id(), Some("Person/ghost"));
    assert_eq!(repo.commit_count().unwrap(), 0);
    assert_eq!(repo.head_id().unwrap(), None);
}

#[test]
fn test_terminal_snapshot_keeps_last_state() {
    // GIVEN {name: "Bob", age: 42} recorded
    let (repo, factory) = setup();
    let bob = person("bob", "Bob", 42);
    let initial = factory.create("alice", no_properties(), &bob).unwrap();
    repo.persist(&initial).unwrap();

    // WHEN it is deleted by id
    let id = GlobalId::new("Person", "bob");
    let commit = factory
        .create_terminal_by_global_id("alice", no_properties(), &id)
        .unwrap();

    // THEN one TERMINAL snapshot with the same state, and one ObjectRemoved
    assert_eq!(commit.snapshots().len(), 1);
    let terminal = &commit.snapshots()[0];
    assert_eq!(terminal.snapshot_type(), SnapshotType::Terminal);
    assert_eq!(terminal.version(), initial.snapshots()[0].version() + 1);
    assert_eq!(terminal.state(), initial.snapshots()[0].state());
    assert_eq!(terminal.state().get("name"), Some(&PropertyValue::from("Bob")));
    assert_eq!(
        commit.diff().changes(),
        &[Change::ObjectRemoved { global_id: id }]
    );
}

#[test]
fn test_terminal_by_object_ignores_unsaved_edits() {
    let (repo, factory) = setup();
    let bob = person("bob", "Bob", 42);
    repo.persist(&factory.create("alice", no_properties(), &bob).unwrap())
        .unwrap();

    bob.set("name", "Robert");
    let commit = factory.create_terminal("alice", no_properties(), &bob).unwrap();

    assert_eq!(
        commit.snapshots()[0].state().get("name"),
        Some(&PropertyValue::from("Bob"))
    );
}

#[test]
fn test_deleting_twice_is_object_not_found() {
    let (repo, factory) = setup();
    let bob = person("bob", "Bob", 42);
    repo.persist(&factory.create("alice", no_properties(), &bob).unwrap())
        .unwrap();
    repo.persist(&factory.create_terminal("alice", no_properties(), &bob).unwrap())
        .unwrap();

    let err = factory
        .create_terminal("alice", no_properties(), &bob)
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::ObjectNotFound);
    assert_eq!(err.op(), Some("create_terminal"));
}

#[test]
fn test_terminal_with_empty_author() {
    let (_repo, factory) = setup();
    let err = factory
        .create_terminal_by_global_id("", no_properties(), &GlobalId::new("Person", "bob"))
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidArgument);
}
