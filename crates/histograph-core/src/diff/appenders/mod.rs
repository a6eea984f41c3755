//! Change appenders, one per value category.
//!
//! Each appender compares the previous and current value of one property and
//! yields at most one [`Change`]. A property absent from the previous state is
//! compared as if it were empty: a null scalar, an unset reference or an
//! empty container.

pub mod list;
pub mod map;
pub mod object;
pub mod reference;
pub mod scalar;
pub mod set;

pub use list::ListDiffPolicy;

use crate::diff::model::Change;
use crate::model::{Element, GlobalId, PropertyValue, ScalarValue};

/// Run the appender matching the current value's category
pub fn detect(
    global_id: &GlobalId,
    property: &str,
    previous: Option<&PropertyValue>,
    current: &PropertyValue,
    policy: &ListDiffPolicy,
) -> Option<Change> {
    if let Some(prev) = previous {
        if prev.category() != current.category() {
            return Some(Change::ValueChange {
                global_id: global_id.clone(),
                property: property.to_string(),
                left: Some(prev.clone()),
                right: current.clone(),
            });
        }
    }

    match current {
        PropertyValue::Scalar(cur) => scalar::detect(global_id, property, previous.and_then(as_scalar), cur),
        PropertyValue::Reference(cur) => reference::detect(
            global_id,
            property,
            previous.and_then(as_reference),
            cur.as_ref(),
        ),
        PropertyValue::List(cur) => {
            let prev = previous.and_then(as_sequence).unwrap_or(&[]);
            list::detect_list(global_id, property, prev, cur, policy)
        }
        PropertyValue::Array(cur) => {
            let prev = previous.and_then(as_sequence).unwrap_or(&[]);
            list::detect_array(global_id, property, prev, cur, policy)
        }
        PropertyValue::Set(cur) => match previous {
            Some(PropertyValue::Set(prev)) => set::detect(global_id, property, prev, cur),
            _ => set::detect(global_id, property, &Default::default(), cur),
        },
        PropertyValue::Map(cur) => match previous {
            Some(PropertyValue::Map(prev)) => map::detect(global_id, property, prev, cur),
            _ => map::detect(global_id, property, &Default::default(), cur),
        },
    }
}

fn as_scalar(value: &PropertyValue) -> Option<&ScalarValue> {
    match value {
        PropertyValue::Scalar(s) => Some(s),
        _ => None,
    }
}

fn as_reference(value: &PropertyValue) -> Option<&GlobalId> {
    match value {
        PropertyValue::Reference(id) => id.as_ref(),
        _ => None,
    }
}

fn as_sequence(value: &PropertyValue) -> Option<&[Element]> {
    match value {
        PropertyValue::List(items) | PropertyValue::Array(items) => Some(items),
        _ => None,
    }
}
