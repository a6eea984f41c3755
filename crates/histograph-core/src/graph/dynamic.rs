//! Dynamic domain objects.
//!
//! A small, schema-light object model for building tracked graphs without a
//! reflective metamodel. Objects are shared handles: mutating one through any
//! clone is visible through every other clone, the way a live domain object
//! graph behaves.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::errors::{HistographError, Result};
use crate::graph::live::{LiveValue, Metamodel};
use crate::model::GlobalId;

struct DynData {
    type_name: String,
    id: String,
    values: HashMap<String, LiveValue<DynObject>>,
}

/// Shared, mutable domain object handle
#[derive(Clone)]
pub struct DynObject(Arc<RwLock<DynData>>);

impl DynObject {
    pub fn new(type_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self(Arc::new(RwLock::new(DynData {
            type_name: type_name.into(),
            id: id.into(),
            values: HashMap::new(),
        })))
    }

    /// Builder-style [`DynObject::set`]
    pub fn with(self, name: impl Into<String>, value: impl Into<LiveValue<DynObject>>) -> Self {
        self.set(name, value);
        self
    }

    /// Set or replace a property value
    pub fn set(&self, name: impl Into<String>, value: impl Into<LiveValue<DynObject>>) {
        let mut data = self.0.write().unwrap_or_else(PoisonError::into_inner);
        data.values.insert(name.into(), value.into());
    }

    /// Drop a property entirely
    pub fn unset(&self, name: &str) {
        let mut data = self.0.write().unwrap_or_else(PoisonError::into_inner);
        data.values.remove(name);
    }

    pub fn type_name(&self) -> String {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .type_name
            .clone()
    }

    pub fn id(&self) -> String {
        self.0.read().unwrap_or_else(PoisonError::into_inner).id.clone()
    }

    pub fn get(&self, name: &str) -> Option<LiveValue<DynObject>> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values
            .get(name)
            .cloned()
    }
}

impl From<DynObject> for LiveValue<DynObject> {
    fn from(object: DynObject) -> Self {
        LiveValue::Reference(Some(object))
    }
}

// Printing values would recurse through reference cycles.
impl fmt::Debug for DynObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("DynObject")
            .field("type_name", &data.type_name)
            .field("id", &data.id)
            .field("properties", &data.values.len())
            .finish()
    }
}

/// [`Metamodel`] over [`DynObject`]s with explicitly registered types
#[derive(Debug, Clone, Default)]
pub struct DynMetamodel {
    types: HashMap<String, Vec<String>>,
}

impl DynMetamodel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type and its properties in declaration order
    pub fn with_type(mut self, type_name: impl Into<String>, properties: &[&str]) -> Self {
        self.types.insert(
            type_name.into(),
            properties.iter().map(|p| p.to_string()).collect(),
        );
        self
    }
}

impl Metamodel for DynMetamodel {
    type Object = DynObject;

    fn type_of(&self, object: &DynObject) -> Result<String> {
        Ok(object.type_name())
    }

    fn properties_of(&self, type_name: &str) -> Result<Vec<String>> {
        self.types.get(type_name).cloned().ok_or_else(|| {
            HistographError::NoIdentityMapping {
                type_name: type_name.to_string(),
            }
            .into()
        })
    }

    fn value_of(&self, object: &DynObject, property: &str) -> Result<LiveValue<DynObject>> {
        object.get(property).ok_or_else(|| {
            HistographError::GraphBuildError {
                reason: format!(
                    "{}/{} has no value for property '{}'",
                    object.type_name(),
                    object.id(),
                    property
                ),
            }
            .into()
        })
    }

    fn identity_of(&self, object: &DynObject) -> Result<GlobalId> {
        let type_name = object.type_name();
        if !self.types.contains_key(&type_name) {
            return Err(HistographError::NoIdentityMapping { type_name }.into());
        }
        let id = object.id();
        if id.trim().is_empty() {
            return Err(HistographError::IdentityError {
                type_name,
                reason: "empty local id".to_string(),
            }
            .into());
        }
        Ok(GlobalId::new(type_name, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;
    use crate::graph::live::{LiveElement, LiveGraphFactory, MetamodelGraphFactory};
    use crate::model::{Element, PropertyValue, ScalarValue};

    fn metamodel() -> DynMetamodel {
        DynMetamodel::new()
            .with_type("Person", &["name", "boss"])
            .with_type("Team", &["members"])
    }

    #[test]
    fn test_shared_handle_sees_mutation() {
        let bob = DynObject::new("Person", "1").with("name", "Bob");
        let alias = bob.clone();
        alias.set("name", "Alice");

        assert!(matches!(bob.get("name"), Some(LiveValue::Scalar(s)) if s == ScalarValue::from("Alice")));
    }

    #[test]
    fn test_unregistered_type_has_no_identity_mapping() {
        let thing = DynObject::new("Thing", "1");
        let err = metamodel().identity_of(&thing).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NoIdentityMapping);
    }

    #[test]
    fn test_empty_id_is_identity_error() {
        let anon = DynObject::new("Person", " ");
        let err = metamodel().identity_of(&anon).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Identity);
    }

    #[test]
    fn test_graph_of_cyclic_objects() {
        let boss = DynObject::new("Person", "boss").with("name", "Carol");
        let bob = DynObject::new("Person", "bob")
            .with("name", "Bob")
            .with("boss", boss.clone());
        boss.set("boss", bob.clone());

        let factory = MetamodelGraphFactory::new(metamodel());
        let graph = factory.create_live_graph(&bob).unwrap();

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.root(), Some(&GlobalId::new("Person", "bob")));
        let bob_cdo = graph.node(&GlobalId::new("Person", "bob")).unwrap();
        assert_eq!(
            bob_cdo.state().get("boss"),
            Some(&PropertyValue::Reference(Some(GlobalId::new("Person", "boss"))))
        );
    }

    #[test]
    fn test_container_members_are_resolved_and_walked() {
        let a = DynObject::new("Person", "a")
            .with("name", "A")
            .with("boss", LiveValue::Reference(None));
        let team = DynObject::new("Team", "t").with(
            "members",
            LiveValue::List(vec![LiveElement::Object(a.clone()), LiveElement::from("guest")]),
        );

        let graph = MetamodelGraphFactory::new(metamodel())
            .create_live_graph(&team)
            .unwrap();

        assert_eq!(graph.len(), 2);
        let team_cdo = graph.node(&GlobalId::new("Team", "t")).unwrap();
        assert_eq!(
            team_cdo.state().get("members"),
            Some(&PropertyValue::List(vec![
                Element::Reference(GlobalId::new("Person", "a")),
                Element::from("guest"),
            ]))
        );
        assert_eq!(team_cdo.global_id().entity_type(), "Team");
    }

    #[test]
    fn test_missing_property_is_graph_build_error() {
        let bob = DynObject::new("Person", "bob").with("name", "Bob");
        let err = MetamodelGraphFactory::new(metamodel())
            .create_live_graph(&bob)
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::GraphBuild);
    }

    #[test]
    fn test_map_keys_colliding_after_resolution_are_rejected() {
        // two handles, one identity: both keys resolve to Person/a
        let a = DynObject::new("Person", "a").with("name", "A");
        let a_again = DynObject::new("Person", "a").with("name", "A");
        let team = DynObject::new("Team", "t").with(
            "members",
            LiveValue::Map(vec![
                (LiveElement::Object(a), LiveElement::from("lead")),
                (LiveElement::Object(a_again), LiveElement::from("member")),
            ]),
        );

        let err = MetamodelGraphFactory::new(metamodel())
            .create_live_graph(&team)
            .unwrap_err();

        assert_eq!(err.kind(), ExErrorKind::GraphBuild);
        assert!(err.message().contains("members"));
        assert!(err.message().contains("Person/a"));
    }
}
