//! Status algebra for asynchronous operations.
//!
//! An operation reports through a stream of [`Outcome`] values: any number of
//! `Progress` markers followed by exactly one terminal value (`Success` or
//! `Failure`). [`ResultOutcome`] is the flattened terminal form handed to
//! callers that only care how the operation ended.
//!
//! # Architecture
//!
//! ```text
//! operation ──→ Progress* ──→ Success | Failure
//!                                  │
//!                        first_result() ──→ ResultOutcome
//! ```

mod stream;

pub use stream::{
    collect_outcome, EmptyStream, FlatMapLatestSuccess, MapSuccess, OnEachOutcome,
    OutcomeStreamExt, DEFAULT_PROGRESS_DELAY,
};

/// Status of an in-flight operation.
///
/// Producers may emit any number of `Progress` values but must finish with a
/// single terminal `Success` or `Failure`; consumers must not rely on any
/// ordering beyond that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<S, E> {
    /// The operation is still running. Carries an optional progress message.
    Progress(Option<String>),
    /// The operation finished with `data`.
    Success(S),
    /// The operation finished with a domain error.
    Failure(E),
}

impl<S, E> Outcome<S, E> {
    /// A progress marker without a message.
    pub fn progress() -> Self {
        Outcome::Progress(None)
    }

    /// A progress marker carrying a message.
    pub fn progress_with(message: impl Into<String>) -> Self {
        Outcome::Progress(Some(message.into()))
    }

    pub fn success(data: S) -> Self {
        Outcome::Success(data)
    }

    pub fn failure(error: E) -> Self {
        Outcome::Failure(error)
    }

    /// True for `Success` and `Failure`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Progress(_))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    /// Apply a pure transform to `Success` data, passing `Progress` and
    /// `Failure` through unchanged.
    pub fn map_data<T>(self, transform: impl FnOnce(S) -> T) -> Outcome<T, E> {
        match self {
            Outcome::Progress(message) => Outcome::Progress(message),
            Outcome::Success(data) => Outcome::Success(transform(data)),
            Outcome::Failure(error) => Outcome::Failure(error),
        }
    }

    /// The terminal form of this value, or `None` for `Progress`.
    pub fn into_result(self) -> Option<ResultOutcome<S, E>> {
        match self {
            Outcome::Progress(_) => None,
            Outcome::Success(data) => Some(ResultOutcome::Success(data)),
            Outcome::Failure(error) => Some(ResultOutcome::Failure(error)),
        }
    }
}

/// Terminal result of an operation, either `Success` or `Failure`.
///
/// Kept separate from [`Outcome`] so call sites that await a single result
/// never have to handle a `Progress` arm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultOutcome<S, E> {
    Success(S),
    Failure(E),
}

impl<S, E> ResultOutcome<S, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, ResultOutcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ResultOutcome::Failure(_))
    }

    /// Apply a pure transform to `Success` data.
    pub fn map_data<T>(self, transform: impl FnOnce(S) -> T) -> ResultOutcome<T, E> {
        match self {
            ResultOutcome::Success(data) => ResultOutcome::Success(transform(data)),
            ResultOutcome::Failure(error) => ResultOutcome::Failure(error),
        }
    }

    /// Convert into a plain [`Result`].
    pub fn ok(self) -> Result<S, E> {
        match self {
            ResultOutcome::Success(data) => Ok(data),
            ResultOutcome::Failure(error) => Err(error),
        }
    }
}

impl<S, E> From<ResultOutcome<S, E>> for Outcome<S, E> {
    fn from(result: ResultOutcome<S, E>) -> Self {
        match result {
            ResultOutcome::Success(data) => Outcome::Success(data),
            ResultOutcome::Failure(error) => Outcome::Failure(error),
        }
    }
}
