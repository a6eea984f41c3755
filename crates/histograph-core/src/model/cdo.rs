use serde::{Deserialize, Serialize};

use super::global_id::GlobalId;
use super::value::PropertyValue;

/// Full property state of one object, in property declaration order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CdoState {
    properties: Vec<(String, PropertyValue)>,
}

impl CdoState {
    /// Create an empty state
    pub fn new() -> Self {
        Self {
            properties: Vec::new(),
        }
    }

    /// Builder-style insert, see [`CdoState::insert`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a property value
    ///
    /// Replacing an existing property keeps its declaration position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        let name = name.into();
        let value = value.into();
        match self.properties.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.properties.push((name, value)),
        }
    }

    /// Look up a property; `None` means the property is not part of this state
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Property names in declaration order
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(n, _)| n.as_str())
    }

    /// (name, value) pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Global ids referenced by any property, in declaration order
    pub fn references(&self) -> Vec<&GlobalId> {
        self.properties
            .iter()
            .flat_map(|(_, v)| v.references())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// A node that can live in an [`ObjectGraph`](crate::graph::ObjectGraph)
///
/// Implemented by live objects ([`Cdo`]) and stored snapshots
/// ([`CdoSnapshot`](super::CdoSnapshot)) so both sides of a diff share one shape.
pub trait GraphNode {
    fn global_id(&self) -> &GlobalId;
    fn state(&self) -> &CdoState;
}

/// Tracked domain object: identity plus state captured from the live object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cdo {
    global_id: GlobalId,
    state: CdoState,
}

impl Cdo {
    pub fn new(global_id: GlobalId, state: CdoState) -> Self {
        Self { global_id, state }
    }

    pub fn global_id(&self) -> &GlobalId {
        &self.global_id
    }

    pub fn state(&self) -> &CdoState {
        &self.state
    }
}

impl GraphNode for Cdo {
    fn global_id(&self) -> &GlobalId {
        &self.global_id
    }

    fn state(&self) -> &CdoState {
        &self.state
    }
}
