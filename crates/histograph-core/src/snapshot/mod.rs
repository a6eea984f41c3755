//! Snapshot creation and retrieval of the latest recorded state.

pub mod changed;
pub mod factory;
pub mod graph_factory;

pub use changed::ChangedSnapshotsFactory;
pub use factory::SnapshotFactory;
pub use graph_factory::{LatestSnapshots, SnapshotGraphFactory};
