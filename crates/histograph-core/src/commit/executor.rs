//! Execution contexts for asynchronous commits.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;

use crate::commit::Commit;
use crate::errors::{ExError, ExErrorKind, Result};

pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs a commit task somewhere
///
/// Dropping the task instead of running it cancels the commit; its future
/// then resolves to `TaskCancelled`.
pub trait Executor {
    fn execute(&self, task: Task);
}

/// One OS thread per task
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadExecutor;

impl Executor for ThreadExecutor {
    fn execute(&self, task: Task) {
        let spawned = std::thread::Builder::new()
            .name("histograph-commit".to_string())
            .spawn(task);
        if let Err(e) = spawned {
            tracing::warn!(error = %e, "Failed to spawn commit thread, task dropped");
        }
    }
}

/// Runs the task on the calling thread before `execute` returns
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, task: Task) {
        task();
    }
}

/// Blocking pool of a tokio runtime
impl Executor for tokio::runtime::Handle {
    fn execute(&self, task: Task) {
        drop(self.spawn_blocking(task));
    }
}

/// Pending result of an asynchronous commit
#[derive(Debug)]
pub struct CommitFuture {
    receiver: oneshot::Receiver<Result<Commit>>,
}

impl CommitFuture {
    pub(crate) fn new(receiver: oneshot::Receiver<Result<Commit>>) -> Self {
        Self { receiver }
    }

    /// Block the current thread until the commit is done
    pub fn wait(self) -> Result<Commit> {
        futures::executor::block_on(self)
    }
}

impl Future for CommitFuture {
    type Output = Result<Commit>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(ExError::new(
                ExErrorKind::TaskCancelled,
            )
            .with_op("create_async")
            .with_message("commit task was dropped before completing"))),
            Poll::Pending => Poll::Pending,
        }
    }
}
