use crate::diff::model::Change;
use crate::model::{GlobalId, PropertyValue, ScalarValue};

/// Value equality; an absent previous value equals `Null`
pub fn detect(
    global_id: &GlobalId,
    property: &str,
    previous: Option<&ScalarValue>,
    current: &ScalarValue,
) -> Option<Change> {
    let unchanged = match previous {
        Some(prev) => prev == current,
        None => current.is_null(),
    };
    if unchanged {
        return None;
    }

    Some(Change::ValueChange {
        global_id: global_id.clone(),
        property: property.to_string(),
        left: previous.cloned().map(PropertyValue::Scalar),
        right: PropertyValue::Scalar(current.clone()),
    })
}
