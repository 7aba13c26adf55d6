//! Asynchronous operation wrappers.
//!
//! Two shapes:
//!
//! - [`UseCase`]: one-shot work returning a single
//!   [`ResultOutcome`](crate::outcome::ResultOutcome). Failures are raised
//!   through a scoped helper and come back as typed values; nothing unwinds
//!   across the boundary.
//! - [`FlowUseCase`] / [`FlowOutcomeUseCase`]: streaming work pushing values
//!   through a collector, consumed as a pull-driven stream.
//!
//! Both run on an explicitly injected [`Dispatcher`](crate::dispatch::Dispatcher)
//! and are cancelled by dropping the invocation; cancellation never turns
//! into a domain error.

mod flow;
mod flow_outcome;
mod use_case;

pub use flow::{FlowCollector, FlowStream, FlowUseCase};
pub use flow_outcome::{FlowOutcomeUseCase, OutcomeCollector};
pub use use_case::{BoxError, UseCase, UseCaseFailure, UseCaseScope};
