//! Object-graph versioning core.
//!
//! Captures a live object graph, compares it with the latest recorded state,
//! and packages the differences into an immutable [`Commit`] holding new
//! snapshots only for the objects that actually changed.

pub mod commit;
pub mod config;
pub mod date;
pub mod diff;
pub mod errors;
pub mod graph;
pub mod logging_facility;
pub mod model;
pub mod repository;
pub mod snapshot;

// Used by the exported logging macros
pub use histograph_core_types as core_types;

pub use commit::{Commit, CommitFactory, CommitFuture, CommitIdFactory, Executor};
pub use config::{CoreConfiguration, ListCompareAlgorithm};
pub use date::{DateProvider, FixedDateProvider, SystemDateProvider};
pub use diff::{Change, Diff, DiffFactory};
pub use errors::{ExError, ExErrorKind, HistographError, Result};
pub use graph::{LiveGraph, LiveGraphFactory, Metamodel, MetamodelGraphFactory, ObjectGraph};
pub use model::{Cdo, CdoSnapshot, CommitId, CommitMetadata, GlobalId, PropertyValue, SnapshotType};
pub use repository::{InMemoryRepository, Repository};
