//! Live graph construction.
//!
//! The core never introspects domain types itself. A [`Metamodel`] supplies
//! type names, property lists, identities and property values; the
//! [`MetamodelGraphFactory`] walks the object graph through it and captures
//! each reachable object as a [`Cdo`].

use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{HistographError, Result};
use crate::graph::object_graph::{LiveGraph, ObjectGraph};
use crate::model::{Cdo, CdoState, Element, GlobalId, PropertyValue, ScalarValue};

/// Container member as seen on a live object
#[derive(Debug, Clone)]
pub enum LiveElement<O> {
    Scalar(ScalarValue),
    Object(O),
}

/// Property value as seen on a live object, before identity resolution
#[derive(Debug, Clone)]
pub enum LiveValue<O> {
    Scalar(ScalarValue),
    Reference(Option<O>),
    List(Vec<LiveElement<O>>),
    Array(Vec<LiveElement<O>>),
    Set(Vec<LiveElement<O>>),
    Map(Vec<(LiveElement<O>, LiveElement<O>)>),
}

impl<O> From<ScalarValue> for LiveValue<O> {
    fn from(value: ScalarValue) -> Self {
        LiveValue::Scalar(value)
    }
}

impl<O> From<ScalarValue> for LiveElement<O> {
    fn from(value: ScalarValue) -> Self {
        LiveElement::Scalar(value)
    }
}

macro_rules! live_scalar_conversions {
    ($($source:ty),*) => {
        $(
            impl<O> From<$source> for LiveValue<O> {
                fn from(value: $source) -> Self {
                    LiveValue::Scalar(ScalarValue::from(value))
                }
            }

            impl<O> From<$source> for LiveElement<O> {
                fn from(value: $source) -> Self {
                    LiveElement::Scalar(ScalarValue::from(value))
                }
            }
        )*
    };
}

live_scalar_conversions!(&str, String, i64, i32, bool, f64);

/// Type metamodel capability
///
/// Supplied by the embedding application; describes how to read identity and
/// property state off its domain objects.
pub trait Metamodel {
    type Object: Clone;

    /// Name of the object's type
    fn type_of(&self, object: &Self::Object) -> Result<String>;

    /// Declared properties of a type, in declaration order
    ///
    /// # Errors
    ///
    /// `NoIdentityMapping` when the type is not mapped.
    fn properties_of(&self, type_name: &str) -> Result<Vec<String>>;

    /// Current value of one property
    fn value_of(&self, object: &Self::Object, property: &str) -> Result<LiveValue<Self::Object>>;

    /// Stable identity of the object
    ///
    /// # Errors
    ///
    /// `NoIdentityMapping` when the type is not mapped, `IdentityError` when
    /// the object's identity cannot be read.
    fn identity_of(&self, object: &Self::Object) -> Result<GlobalId>;
}

/// Builds live graphs from root objects
pub trait LiveGraphFactory {
    type Object;

    /// Capture the graph reachable from `root`
    fn create_live_graph(&self, root: &Self::Object) -> Result<LiveGraph>;

    /// Resolve the identity of a single object without walking its graph
    fn identity_of(&self, object: &Self::Object) -> Result<GlobalId>;
}

/// [`LiveGraphFactory`] backed by a [`Metamodel`]
#[derive(Debug, Clone)]
pub struct MetamodelGraphFactory<M> {
    metamodel: M,
}

impl<M: Metamodel> MetamodelGraphFactory<M> {
    pub fn new(metamodel: M) -> Self {
        Self { metamodel }
    }

    pub fn metamodel(&self) -> &M {
        &self.metamodel
    }

    fn capture_element(
        &self,
        element: LiveElement<M::Object>,
        pending: &mut Vec<M::Object>,
    ) -> Result<Element> {
        match element {
            LiveElement::Scalar(s) => Ok(Element::Scalar(s)),
            LiveElement::Object(o) => {
                let id = self.metamodel.identity_of(&o)?;
                pending.push(o);
                Ok(Element::Reference(id))
            }
        }
    }

    fn capture_elements(
        &self,
        elements: Vec<LiveElement<M::Object>>,
        pending: &mut Vec<M::Object>,
    ) -> Result<Vec<Element>> {
        elements
            .into_iter()
            .map(|e| self.capture_element(e, pending))
            .collect()
    }

    /// Resolve object handles to ids; referenced objects are queued on `pending`
    ///
    /// Map keys must stay distinct after resolution, otherwise an entry would
    /// be dropped silently.
    fn capture_value(
        &self,
        property: &str,
        value: LiveValue<M::Object>,
        pending: &mut Vec<M::Object>,
    ) -> Result<PropertyValue> {
        Ok(match value {
            LiveValue::Scalar(s) => PropertyValue::Scalar(s),
            LiveValue::Reference(None) => PropertyValue::Reference(None),
            LiveValue::Reference(Some(o)) => {
                let id = self.metamodel.identity_of(&o)?;
                pending.push(o);
                PropertyValue::Reference(Some(id))
            }
            LiveValue::List(items) => PropertyValue::List(self.capture_elements(items, pending)?),
            LiveValue::Array(items) => PropertyValue::Array(self.capture_elements(items, pending)?),
            LiveValue::Set(items) => PropertyValue::Set(
                self.capture_elements(items, pending)?
                    .into_iter()
                    .collect::<BTreeSet<_>>(),
            ),
            LiveValue::Map(entries) => {
                let mut map = BTreeMap::new();
                for (k, v) in entries {
                    let key = self.capture_element(k, pending)?;
                    let value = self.capture_element(v, pending)?;
                    if map.contains_key(&key) {
                        return Err(HistographError::GraphBuildError {
                            reason: format!("map property '{}' has duplicate key {}", property, key),
                        }
                        .into());
                    }
                    map.insert(key, value);
                }
                PropertyValue::Map(map)
            }
        })
    }

    fn capture_state(
        &self,
        object: &M::Object,
        pending: &mut Vec<M::Object>,
    ) -> Result<CdoState> {
        let type_name = self.metamodel.type_of(object)?;
        let mut state = CdoState::new();
        for property in self.metamodel.properties_of(&type_name)? {
            let live = self.metamodel.value_of(object, &property)?;
            let value = self.capture_value(&property, live, pending)?;
            state.insert(property, value);
        }
        Ok(state)
    }
}

impl<M: Metamodel> LiveGraphFactory for MetamodelGraphFactory<M> {
    type Object = M::Object;

    fn create_live_graph(&self, root: &M::Object) -> Result<LiveGraph> {
        let root_id = self.metamodel.identity_of(root)?;
        let mut cdos: BTreeMap<GlobalId, Cdo> = BTreeMap::new();
        let mut stack = vec![root.clone()];

        while let Some(object) = stack.pop() {
            let id = self.metamodel.identity_of(&object)?;
            if cdos.contains_key(&id) {
                continue;
            }
            let mut pending = Vec::new();
            let state = self.capture_state(&object, &mut pending)?;
            cdos.insert(id.clone(), Cdo::new(id, state));
            // reversed so the first declared reference is walked first
            stack.extend(pending.into_iter().rev());
        }

        tracing::debug!(root = %root_id, node_count = cdos.len(), "Built live graph");
        ObjectGraph::from_nodes(Some(root_id), cdos.into_values())
    }

    fn identity_of(&self, object: &M::Object) -> Result<GlobalId> {
        self.metamodel.identity_of(object)
    }
}
