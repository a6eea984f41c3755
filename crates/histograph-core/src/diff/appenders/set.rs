use std::collections::BTreeSet;

use crate::diff::model::{Change, ContainerElementChange};
use crate::model::{Element, GlobalId};

/// Symmetric difference: added elements, then removed ones, each in element order
pub fn detect(
    global_id: &GlobalId,
    property: &str,
    previous: &BTreeSet<Element>,
    current: &BTreeSet<Element>,
) -> Option<Change> {
    let added = current
        .difference(previous)
        .map(|e| ContainerElementChange::ValueAdded {
            index: None,
            value: e.clone(),
        });
    let removed = previous
        .difference(current)
        .map(|e| ContainerElementChange::ValueRemoved {
            index: None,
            value: e.clone(),
        });
    let changes: Vec<_> = added.chain(removed).collect();

    if changes.is_empty() {
        return None;
    }
    Some(Change::SetChange {
        global_id: global_id.clone(),
        property: property.to_string(),
        changes,
    })
}
