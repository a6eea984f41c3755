//! Histograph Facade Tests
//!
//! ## Scenarios Covered
//!
//! 1. Commits are persisted; no-op commits are not
//! 2. Shallow delete by object and by id
//! 3. Comparing two live graphs leaves the repository alone
//! 4. Asynchronous commits persist on the executor
//! 5. History queries

mod common;

use common::{histograph, no_properties, person, team};
use histograph_core::commit::{InlineExecutor, ThreadExecutor};
use histograph_core::diff::ContainerElementChange;
use histograph_core::model::{Element, ScalarValue};
use histograph_core::{Change, ExErrorKind, GlobalId, PropertyValue, SnapshotType};
use std::collections::BTreeMap;

fn bob_id() -> GlobalId {
    GlobalId::new("Person", "bob")
}

#[test]
fn test_commit_persists_snapshots() {
    // GIVEN a team with one member
    let hg = histograph();
    let bob = person("bob", "Bob", 42);
    let devs = team("devs", "Developers", &[&bob]);

    // WHEN the team is committed
    let commit = hg.commit("alice", &devs).unwrap();

    // THEN both objects are recorded at version 1
    assert_eq!(commit.snapshots().len(), 2);
    let latest = hg.get_latest_snapshot(&bob_id()).unwrap().unwrap();
    assert_eq!(latest.version(), 1);
    assert_eq!(latest.snapshot_type(), SnapshotType::Initial);
    assert_eq!(latest.commit_metadata().id(), commit.id());
    assert_eq!(hg.repository().head_id().unwrap(), Some(commit.id()));
}

#[test]
fn test_noop_commit_is_not_persisted() {
    let hg = histograph();
    let bob = person("bob", "Bob", 42);
    let first = hg.commit("alice", &bob).unwrap();

    let second = hg.commit("alice", &bob).unwrap();

    assert!(second.is_empty());
    assert!(second.id() > first.id());
    assert_eq!(hg.repository().head_id().unwrap(), Some(first.id()));
    assert_eq!(hg.get_state_history(&bob_id(), 10).unwrap().len(), 1);
}

#[test]
fn test_commit_properties_are_recorded() {
    let hg = histograph();
    let mut properties = BTreeMap::new();
    properties.insert("reason".to_string(), "onboarding".to_string());

    let commit = hg
        .commit_with_properties("alice", properties, &person("bob", "Bob", 42))
        .unwrap();

    let latest = hg.get_latest_snapshot(&bob_id()).unwrap().unwrap();
    assert_eq!(
        latest.commit_metadata().properties().get("reason"),
        Some(&"onboarding".to_string())
    );
    assert_eq!(commit.author(), "alice");
}

#[test]
fn test_shallow_delete_leaves_references_alone() {
    // GIVEN a committed team with one member
    let hg = histograph();
    let bob = person("bob", "Bob", 42);
    let devs = team("devs", "Developers", &[&bob]);
    hg.commit("alice", &devs).unwrap();

    // WHEN the team is deleted
    let commit = hg
        .commit_shallow_delete("alice", no_properties(), &devs)
        .unwrap();

    // THEN only the team is terminal
    assert_eq!(
        commit.diff().changes(),
        &[Change::ObjectRemoved {
            global_id: GlobalId::new("Team", "devs")
        }]
    );
    let team_latest = hg
        .get_latest_snapshot(&GlobalId::new("Team", "devs"))
        .unwrap()
        .unwrap();
    assert!(team_latest.is_terminal());
    assert_eq!(team_latest.version(), 2);
    assert!(!hg.get_latest_snapshot(&bob_id()).unwrap().unwrap().is_terminal());
}

#[test]
fn test_delete_by_id_twice_is_not_found() {
    let hg = histograph();
    hg.commit("alice", &person("bob", "Bob", 42)).unwrap();
    hg.commit_shallow_delete_by_id("alice", no_properties(), &bob_id())
        .unwrap();

    let err = hg
        .commit_shallow_delete_by_id("alice", no_properties(), &bob_id())
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::ObjectNotFound);
    assert_eq!(hg.get_state_history(&bob_id(), 10).unwrap().len(), 2);
}

#[test]
fn test_compare_does_not_touch_repository() {
    // GIVEN two versions of a team that gained a member
    let hg = histograph();
    let bob = person("bob", "Bob", 42);
    let carol = person("carol", "Carol", 51);
    let before = team("devs", "Developers", &[&bob]);
    let after = team("devs", "Developers", &[&bob, &carol]);

    // WHEN they are compared
    let diff = hg.compare(&before, &after).unwrap();

    // THEN the member list changed and carol is new
    let team_id = GlobalId::new("Team", "devs");
    assert!(diff.changes().contains(&Change::ListChange {
        global_id: team_id,
        property: "members".to_string(),
        changes: vec![ContainerElementChange::ValueAdded {
            index: Some(1),
            value: Element::Reference(GlobalId::new("Person", "carol")),
        }],
    }));
    assert!(diff.changes().contains(&Change::NewObject {
        global_id: GlobalId::new("Person", "carol")
    }));
    assert_eq!(diff.len(), 2);
    assert!(diff.commit_metadata().is_none());
    assert_eq!(hg.repository().head_id().unwrap(), None);
}

#[test]
fn test_async_commit_persists_in_task() {
    let hg = histograph();
    let bob = person("bob", "Bob", 42);

    let future = hg
        .commit_async("alice", no_properties(), &bob, &ThreadExecutor)
        .unwrap();
    let commit = future.wait().unwrap();

    let latest = hg.get_latest_snapshot(&bob_id()).unwrap().unwrap();
    assert_eq!(latest.commit_metadata().id(), commit.id());
}

#[test]
fn test_async_inline_commit_records_update() {
    // GIVEN bob committed through the inline executor
    let hg = histograph();
    let bob = person("bob", "Bob", 42);
    let pending = hg
        .commit_async("alice", no_properties(), &bob, &InlineExecutor)
        .unwrap();
    pending.wait().unwrap();

    // WHEN bob changes and is committed inline again
    bob.set("age", 43i64);
    let commit = hg
        .commit_async("alice", no_properties(), &bob, &InlineExecutor)
        .unwrap()
        .wait()
        .unwrap();

    // THEN the update is stored as version 2
    assert_eq!(
        commit.diff().changes(),
        &[Change::ValueChange {
            global_id: bob_id(),
            property: "age".to_string(),
            left: Some(PropertyValue::Scalar(ScalarValue::from(42i64))),
            right: PropertyValue::Scalar(ScalarValue::from(43i64)),
        }]
    );
    assert_eq!(hg.get_latest_snapshot(&bob_id()).unwrap().unwrap().version(), 2);
}

#[test]
fn test_history_newest_first() {
    let hg = histograph();
    let bob = person("bob", "Bob", 40);
    for age in 40i64..44 {
        bob.set("age", age);
        hg.commit("alice", &bob).unwrap();
    }

    let history = hg.get_state_history(&bob_id(), 3).unwrap();

    let versions: Vec<u64> = history.iter().map(|s| s.version()).collect();
    assert_eq!(versions, vec![4, 3, 2]);
}
