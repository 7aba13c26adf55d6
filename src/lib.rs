//! Reusable state-management building blocks for UI applications.
//!
//! The crate centers on a unidirectional data flow:
//!
//! ```text
//! Intent ──→ StateViewModel ──→ UseCase / FlowOutcomeUseCase
//!    ↑              │                      │
//!    │         state / events         Outcome stream
//!    └──────────── View ←──────────────────┘
//! ```
//!
//! - [`viewmodel`]: the [`StateViewModel`](viewmodel::StateViewModel) state
//!   machine with serialized state mutation, a per-variant state cache,
//!   intent routing, UI events and navigation dispatch.
//! - [`outcome`]: the [`Outcome`](outcome::Outcome) progress/success/failure
//!   algebra and its stream combinators.
//! - [`usecase`]: one-shot and streaming operation wrappers producing
//!   outcome values, on explicitly injected execution contexts.
//! - [`event`] / [`navigation`]: drop-oldest broadcast delivery for one-shot
//!   UI events and navigation commands.
//! - [`datastore`] / [`api`]: contracts for the key-value storage and HTTP
//!   transport collaborators.
//! - [`logger`]: the logging sink contract, defaulting to `tracing`.

pub mod api;
pub mod datastore;
pub mod dispatch;
pub mod event;
pub mod logger;
pub mod navigation;
pub mod outcome;
pub mod usecase;
pub mod viewmodel;

pub use dispatch::Dispatcher;
pub use event::{DefaultEventBus, EventBus, EventStream};
pub use logger::{LogLevel, Logger, TracingLogger};
pub use navigation::{
    DefaultNavigationDispatcher, NavDestination, NavOptions, NavResultKey, NavigationDispatcher,
    NavigationEvent,
};
pub use outcome::{Outcome, OutcomeStreamExt, ResultOutcome};
pub use usecase::{FlowOutcomeUseCase, FlowUseCase, UseCase, UseCaseScope};
pub use viewmodel::{StateViewModel, ViewEvent, ViewModel, ViewState};
