//! Object-level appenders. These never compare properties.

use crate::diff::model::Change;
use crate::model::GlobalId;

/// Object seen for the first time
pub fn new_object(global_id: &GlobalId) -> Change {
    Change::NewObject {
        global_id: global_id.clone(),
    }
}

/// Object explicitly deleted
pub fn object_removed(global_id: &GlobalId) -> Change {
    Change::ObjectRemoved {
        global_id: global_id.clone(),
    }
}
