pub mod cdo;
pub mod commit;
pub mod global_id;
pub mod snapshot;
pub mod value;

pub use cdo::{Cdo, CdoState, GraphNode};
pub use commit::{CommitId, CommitMetadata};
pub use global_id::GlobalId;
pub use snapshot::{CdoSnapshot, SnapshotType};
pub use value::{Element, PropertyValue, ScalarValue, ValueCategory};
