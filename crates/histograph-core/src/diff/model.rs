//! Change records and the Diff aggregate.
//!
//! Every record carries the GlobalId of the object it belongs to. Records are
//! immutable once produced and serialize deterministically.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::model::{CommitMetadata, Element, GlobalId, PropertyValue};

/// Element-level edit inside a list, array or set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ContainerElementChange {
    /// `index` is the position in the new sequence; `None` for sets
    ValueAdded { index: Option<usize>, value: Element },
    /// `index` is the position in the old sequence; `None` for sets
    ValueRemoved { index: Option<usize>, value: Element },
    /// Element replaced in place; `index` is the position in the new sequence
    ElementValueChange {
        index: usize,
        left: Element,
        right: Element,
    },
}

impl ContainerElementChange {
    pub fn index(&self) -> Option<usize> {
        match self {
            ContainerElementChange::ValueAdded { index, .. }
            | ContainerElementChange::ValueRemoved { index, .. } => *index,
            ContainerElementChange::ElementValueChange { index, .. } => Some(*index),
        }
    }
}

/// Key-level edit inside a map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EntryChange {
    EntryAdded { key: Element, value: Element },
    EntryRemoved { key: Element, value: Element },
    EntryValueChange {
        key: Element,
        left: Element,
        right: Element,
    },
}

/// One detected difference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Change {
    /// Object present only in the current graph
    NewObject { global_id: GlobalId },
    /// Object explicitly deleted
    ObjectRemoved { global_id: GlobalId },
    /// Scalar value change, or any change of value category
    ///
    /// `left` is `None` when the previous state did not have the property.
    ValueChange {
        global_id: GlobalId,
        property: String,
        left: Option<PropertyValue>,
        right: PropertyValue,
    },
    ReferenceChange {
        global_id: GlobalId,
        property: String,
        left: Option<GlobalId>,
        right: Option<GlobalId>,
    },
    ListChange {
        global_id: GlobalId,
        property: String,
        changes: Vec<ContainerElementChange>,
    },
    ArrayChange {
        global_id: GlobalId,
        property: String,
        changes: Vec<ContainerElementChange>,
    },
    SetChange {
        global_id: GlobalId,
        property: String,
        changes: Vec<ContainerElementChange>,
    },
    MapChange {
        global_id: GlobalId,
        property: String,
        changes: Vec<EntryChange>,
    },
}

impl Change {
    /// Identity of the object this change belongs to
    pub fn global_id(&self) -> &GlobalId {
        match self {
            Change::NewObject { global_id }
            | Change::ObjectRemoved { global_id }
            | Change::ValueChange { global_id, .. }
            | Change::ReferenceChange { global_id, .. }
            | Change::ListChange { global_id, .. }
            | Change::ArrayChange { global_id, .. }
            | Change::SetChange { global_id, .. }
            | Change::MapChange { global_id, .. } => global_id,
        }
    }

    /// Property name, for property-level changes
    pub fn property(&self) -> Option<&str> {
        match self {
            Change::NewObject { .. } | Change::ObjectRemoved { .. } => None,
            Change::ValueChange { property, .. }
            | Change::ReferenceChange { property, .. }
            | Change::ListChange { property, .. }
            | Change::ArrayChange { property, .. }
            | Change::SetChange { property, .. }
            | Change::MapChange { property, .. } => Some(property),
        }
    }
}

/// Ordered sequence of changes between two object graphs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Diff {
    changes: Vec<Change>,
    commit_metadata: Option<Arc<CommitMetadata>>,
}

impl Diff {
    pub fn new(changes: Vec<Change>, commit_metadata: Option<Arc<CommitMetadata>>) -> Self {
        Self {
            changes,
            commit_metadata,
        }
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn commit_metadata(&self) -> Option<&Arc<CommitMetadata>> {
        self.commit_metadata.as_ref()
    }

    /// Changes belonging to one object, in diff order
    pub fn changes_for<'a>(&'a self, id: &'a GlobalId) -> impl Iterator<Item = &'a Change> + 'a {
        self.changes.iter().filter(move |c| c.global_id() == id)
    }

    /// Distinct property names touched per object, each in first-seen order
    pub fn changed_properties(&self) -> BTreeMap<&GlobalId, Vec<&str>> {
        let mut grouped: BTreeMap<&GlobalId, Vec<&str>> = BTreeMap::new();
        for change in &self.changes {
            let properties = grouped.entry(change.global_id()).or_default();
            if let Some(property) = change.property() {
                if !properties.contains(&property) {
                    properties.push(property);
                }
            }
        }
        grouped
    }

    /// Identities with at least one change
    pub fn affected_ids(&self) -> BTreeSet<&GlobalId> {
        self.changes.iter().map(Change::global_id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }
}
