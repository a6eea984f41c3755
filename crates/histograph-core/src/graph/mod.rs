//! Object graphs: the generic identity-keyed container, the live graph
//! builder and the dynamic object model.

pub mod dynamic;
pub mod live;
pub mod object_graph;

pub use dynamic::{DynMetamodel, DynObject};
pub use live::{LiveElement, LiveGraphFactory, LiveValue, Metamodel, MetamodelGraphFactory};
pub use object_graph::{LiveGraph, ObjectGraph, Traversal};
