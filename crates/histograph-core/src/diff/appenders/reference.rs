use crate::diff::model::Change;
use crate::model::GlobalId;

/// Target identity equality; setting or clearing a reference is a change
pub fn detect(
    global_id: &GlobalId,
    property: &str,
    previous: Option<&GlobalId>,
    current: Option<&GlobalId>,
) -> Option<Change> {
    if previous == current {
        return None;
    }

    Some(Change::ReferenceChange {
        global_id: global_id.clone(),
        property: property.to_string(),
        left: previous.cloned(),
        right: current.cloned(),
    })
}
