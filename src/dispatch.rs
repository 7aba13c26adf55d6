//! Explicit execution contexts.
//!
//! Nothing in this crate runs work on an ambient global executor. Every
//! construct that schedules work takes a [`Dispatcher`] at construction, so
//! call sites always know (and tests always control) where the work runs.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Handle to the execution context a component schedules its work on.
///
/// Cloning is cheap; clones share the underlying runtime handle.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    handle: Handle,
}

impl Dispatcher {
    /// Wrap an explicit runtime handle.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// The dispatcher for the runtime the caller is currently running on.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime, like [`Handle::current`].
    pub fn current() -> Self {
        Self {
            handle: Handle::current(),
        }
    }

    /// Run a future on this context and hand back its result.
    ///
    /// Dropping the returned task aborts the spawned work, so caller
    /// cancellation propagates into the dispatched future. A panic inside the
    /// future resumes on the awaiting caller.
    pub fn run<T>(&self, future: impl Future<Output = T> + Send + 'static) -> DispatchedTask<T>
    where
        T: Send + 'static,
    {
        DispatchedTask {
            handle: self.handle.spawn(future),
        }
    }

    /// Fire-and-forget variant of [`Dispatcher::run`].
    ///
    /// The caller owns the returned join handle; aborting it is the only way
    /// to cancel the work.
    pub fn spawn<T>(&self, future: impl Future<Output = T> + Send + 'static) -> JoinHandle<T>
    where
        T: Send + 'static,
    {
        self.handle.spawn(future)
    }
}

/// In-flight work scheduled through [`Dispatcher::run`].
///
/// Resolves to the future's output. Dropped before completion, it aborts the
/// underlying task.
#[derive(Debug)]
pub struct DispatchedTask<T> {
    handle: JoinHandle<T>,
}

impl<T> Future for DispatchedTask<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.handle).poll(cx) {
            Poll::Ready(Ok(value)) => Poll::Ready(value),
            Poll::Ready(Err(err)) => {
                if err.is_panic() {
                    std::panic::resume_unwind(err.into_panic());
                }
                // We only abort from our own Drop, which also drops this
                // future; a cancelled task cannot be observed here.
                panic!("dispatched task was aborted externally");
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> Drop for DispatchedTask<T> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
