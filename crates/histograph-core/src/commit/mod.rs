//! Commit creation: id allocation, execution contexts and the orchestrating
//! [`CommitFactory`].

pub mod executor;
pub mod factory;
pub mod id_factory;
pub mod model;

pub use executor::{CommitFuture, Executor, InlineExecutor, Task, ThreadExecutor};
pub use factory::CommitFactory;
pub use id_factory::CommitIdFactory;
pub use model::Commit;
