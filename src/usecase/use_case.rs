//! One-shot use cases.

use std::marker::PhantomData;

use async_trait::async_trait;

use crate::dispatch::Dispatcher;
use crate::outcome::ResultOutcome;

/// Boxed error for failures not raised through the scope.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why a use case body short-circuited.
///
/// The two arms are structurally distinct so a raised domain error can never
/// be run through `map_error` a second time: `Raised` is final, `Unhandled`
/// still needs mapping.
#[derive(Debug)]
pub enum UseCaseFailure<E> {
    /// Raised deliberately through [`UseCaseScope`]; already a domain error.
    Raised(E),
    /// Escaped from a fallible operation via `?`; mapped by
    /// [`UseCase::map_error`] at the invoke boundary.
    Unhandled(BoxError),
}

impl<E, T> From<T> for UseCaseFailure<E>
where
    T: std::error::Error + Send + Sync + 'static,
{
    fn from(error: T) -> Self {
        UseCaseFailure::Unhandled(Box::new(error))
    }
}

/// Helpers available to a use case body for raising typed failures.
///
/// `raise` and `ensure` short-circuit the body; `catch` converts a
/// sub-operation's error into a raise. Use `return scope.raise(error)` to
/// abort mid-body, or `scope.ensure(..)?` for conditional checks.
pub struct UseCaseScope<E> {
    _marker: PhantomData<fn() -> E>,
}

impl<E> UseCaseScope<E> {
    fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// Abort the body with a domain error.
    pub fn raise<T>(&self, error: E) -> Result<T, UseCaseFailure<E>> {
        Err(UseCaseFailure::Raised(error))
    }

    /// Raise `error` when `condition` does not hold.
    pub fn ensure(
        &self,
        condition: bool,
        error: impl FnOnce() -> E,
    ) -> Result<(), UseCaseFailure<E>> {
        if condition {
            Ok(())
        } else {
            Err(UseCaseFailure::Raised(error()))
        }
    }

    /// Run a fallible sub-operation, raising its error through `mapper`.
    pub async fn catch<T, Err>(
        &self,
        block: impl std::future::Future<Output = Result<T, Err>> + Send,
        mapper: impl FnOnce(Err) -> E + Send,
    ) -> Result<T, UseCaseFailure<E>> {
        block.await.map_err(|error| UseCaseFailure::Raised(mapper(error)))
    }
}

/// A one-shot asynchronous operation with typed output and error.
///
/// Implementations provide `execute` plus an error mapping for failures that
/// escape via `?`; callers only ever see `invoke`, which runs the body on the
/// injected dispatcher and always returns a terminal [`ResultOutcome`].
/// A cancelled invocation resumes nobody: the caller never observes a
/// `Failure` for it.
#[async_trait]
pub trait UseCase: Clone + Send + Sync + 'static {
    type Params: Send + 'static;
    type Output: Send + 'static;
    type Error: Send + 'static;

    /// Execution context this use case runs on.
    fn dispatcher(&self) -> &Dispatcher;

    /// The operation body.
    async fn execute(
        &self,
        scope: &UseCaseScope<Self::Error>,
        params: Self::Params,
    ) -> Result<Self::Output, UseCaseFailure<Self::Error>>;

    /// Convert a failure that escaped the body without being raised.
    fn map_error(&self, error: BoxError) -> Self::Error;

    /// Run the operation on the dispatcher and await its terminal result.
    async fn invoke(&self, params: Self::Params) -> ResultOutcome<Self::Output, Self::Error> {
        let this = self.clone();
        let result = self
            .dispatcher()
            .run(async move {
                let scope = UseCaseScope::new();
                this.execute(&scope, params).await
            })
            .await;

        match result {
            Ok(output) => ResultOutcome::Success(output),
            Err(UseCaseFailure::Raised(error)) => ResultOutcome::Failure(error),
            Err(UseCaseFailure::Unhandled(error)) => ResultOutcome::Failure(self.map_error(error)),
        }
    }
}
