//! Graph diffing.
//!
//! [`DiffFactory`] walks two object graphs and dispatches every property pair
//! to the appender of its value category. The output is deterministic for
//! identical inputs.

pub mod appenders;
pub mod factory;
pub mod model;

pub use appenders::ListDiffPolicy;
pub use factory::DiffFactory;
pub use model::{Change, ContainerElementChange, Diff, EntryChange};
