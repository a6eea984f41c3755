//! Histograph Engine - composition root
//!
//! Wires the core pipeline to a repository and exposes the `Histograph`
//! facade: commit and persist object graphs, delete objects, compare graphs
//! and read snapshot history.

pub mod builder;
pub mod histograph;

pub use builder::HistographBuilder;
pub use histograph::Histograph;
