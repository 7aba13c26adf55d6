//! State machine backing a unidirectional-data-flow view model.
//!
//! # Architecture
//!
//! ```text
//! Intent ──→ execute_intent ──→ handler ──→ set_state/reduce_state ──→ State ──→ View
//!    ↑                                   └──→ UI events / navigation        │
//!    └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A [`StateViewModel`] owns exactly one current [`ViewState`] value and an
//! LRU cache of the latest state per variant. Every mutation is scheduled
//! onto a worker task bound to the instance, so concurrent callers are
//! serialized and updates apply in the order they were scheduled. Dropping
//! the instance aborts the worker, pending mutations, and everything spawned
//! through [`StateViewModel::spawn`].
//!
//! Variant mismatches in [`StateViewModel::reduce_state`],
//! [`StateViewModel::resolve_state`] and [`ViewModel::handle_intent`] are
//! wiring bugs and fail fatally instead of being reported as errors.

mod lru;

pub use lru::LruCache;

use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::dispatch::Dispatcher;
use crate::event::{DefaultEventBus, EventBus, EventStream};
use crate::logger::{LogLevel, Logger, TracingLogger};
use crate::navigation::{
    DefaultNavigationDispatcher, NavDestination, NavigationDispatcher, NavigationEvent,
};

/// States cached per view model unless configured otherwise.
pub const DEFAULT_STATE_CACHE_SIZE: usize = 10;

/// A view model's state value.
///
/// States are immutable: a transition always replaces the whole value.
/// `Tag` is the explicit variant discriminant used for handler gating and
/// state-cache keying.
pub trait ViewState: Clone + fmt::Debug + Send + Sync + 'static {
    type Tag: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    /// The variant discriminant of this value.
    fn tag(&self) -> Self::Tag;
}

/// Marker trait for one-shot UI event payloads.
pub trait ViewEvent: Clone + fmt::Debug + Send + 'static {}

impl ViewEvent for () {}

enum Command<S: ViewState, E, D> {
    SetState { state: S, cache: bool },
    SendEvent(E),
    Navigate(NavigationEvent<D>),
    Flush(oneshot::Sender<()>),
}

/// Observer over a view model's state: the current value first, then every
/// update. Conflating: a slow observer sees the latest value, not every
/// intermediate one.
pub struct StateFlow<S> {
    rx: watch::Receiver<S>,
    primed: bool,
}

impl<S: Clone> StateFlow<S> {
    fn new(rx: watch::Receiver<S>) -> Self {
        Self { rx, primed: false }
    }

    /// The latest state without waiting.
    pub fn current(&self) -> S {
        self.rx.borrow().clone()
    }

    /// Next state to observe, or `None` once the view model is gone.
    pub async fn next(&mut self) -> Option<S> {
        if !self.primed {
            self.primed = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        match self.rx.changed().await {
            Ok(()) => Some(self.rx.borrow_and_update().clone()),
            Err(_) => None,
        }
    }
}

/// Builder for [`StateViewModel`]. Only the initial state is required.
pub struct StateViewModelBuilder<S: ViewState, E: ViewEvent, D: NavDestination = ()> {
    initial_state: S,
    event_bus: Option<Arc<dyn EventBus<E>>>,
    navigation: Option<Arc<dyn NavigationDispatcher<D>>>,
    state_cache_size: usize,
    logger: Arc<dyn Logger>,
    dispatcher: Option<Dispatcher>,
    log_tag: String,
}

impl<S: ViewState, E: ViewEvent, D: NavDestination> StateViewModelBuilder<S, E, D> {
    /// Route UI events to a shared bus instead of the private channel.
    pub fn event_bus(mut self, bus: Arc<dyn EventBus<E>>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Dispatch navigation through a shared dispatcher. Without one, the view
    /// model keeps a private dispatcher nobody may be listening to.
    pub fn navigation(mut self, dispatcher: Arc<dyn NavigationDispatcher<D>>) -> Self {
        self.navigation = Some(dispatcher);
        self
    }

    /// Capacity of the per-variant state cache.
    pub fn state_cache_size(mut self, size: usize) -> Self {
        self.state_cache_size = size;
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Execution context for the worker and [`StateViewModel::spawn`].
    /// Defaults to the runtime the builder runs on.
    pub fn dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Tag used when logging state transitions. Defaults to the state type's
    /// name.
    pub fn log_tag(mut self, tag: impl Into<String>) -> Self {
        self.log_tag = tag.into();
        self
    }

    pub fn build(self) -> StateViewModel<S, E, D> {
        let dispatcher = self.dispatcher.unwrap_or_else(Dispatcher::current);
        let navigation = self
            .navigation
            .unwrap_or_else(|| Arc::new(DefaultNavigationDispatcher::new()));
        let cache = Arc::new(LruCache::new(self.state_cache_size));
        let (state_tx, state_rx) = watch::channel(self.initial_state);
        let private_events = Arc::new(DefaultEventBus::new());
        let (command_tx, mut command_rx) = mpsc::unbounded_channel::<Command<S, E, D>>();

        let worker = {
            let cache = Arc::clone(&cache);
            let private_events = Arc::clone(&private_events);
            let event_bus = self.event_bus;
            let logger = self.logger;
            let log_tag = self.log_tag;
            dispatcher.spawn(async move {
                while let Some(command) = command_rx.recv().await {
                    match command {
                        Command::SetState {
                            state,
                            cache: cache_state,
                        } => {
                            logger.log(
                                LogLevel::Info,
                                &log_tag,
                                None,
                                &format!("state update :: {state:?}"),
                            );
                            if cache_state {
                                cache.put(state.tag(), state.clone());
                            }
                            let _ = state_tx.send(state);
                        }
                        Command::SendEvent(event) => match &event_bus {
                            Some(bus) => bus.send_event(event),
                            None => private_events.send_event(event),
                        },
                        Command::Navigate(event) => navigation.dispatch(event),
                        Command::Flush(ack) => {
                            let _ = ack.send(());
                        }
                    }
                }
            })
        };

        StateViewModel {
            state: state_rx,
            commands: command_tx,
            cache,
            private_events,
            worker,
            tasks: Mutex::new(Vec::new()),
            dispatcher,
        }
    }
}

/// State machine for one screen or feature.
///
/// See the [module docs](self) for the execution model. Concrete view models
/// hold one of these and implement [`ViewModel`] for intent routing.
pub struct StateViewModel<S: ViewState, E: ViewEvent, D: NavDestination = ()> {
    state: watch::Receiver<S>,
    commands: mpsc::UnboundedSender<Command<S, E, D>>,
    cache: Arc<LruCache<S::Tag, S>>,
    private_events: Arc<DefaultEventBus<E>>,
    worker: JoinHandle<()>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    dispatcher: Dispatcher,
}

impl<S: ViewState, E: ViewEvent, D: NavDestination> StateViewModel<S, E, D> {
    /// Start configuring a view model from its initial state.
    pub fn builder(initial_state: S) -> StateViewModelBuilder<S, E, D> {
        StateViewModelBuilder {
            initial_state,
            event_bus: None,
            navigation: None,
            state_cache_size: DEFAULT_STATE_CACHE_SIZE,
            logger: Arc::new(TracingLogger),
            dispatcher: None,
            log_tag: std::any::type_name::<S>().to_string(),
        }
    }

    /// Build with all defaults.
    pub fn new(initial_state: S) -> Self {
        Self::builder(initial_state).build()
    }

    /// The current state value.
    pub fn current_state(&self) -> S {
        self.state.borrow().clone()
    }

    /// Observe the state: current value on subscribe, then updates.
    pub fn collect_state_flow(&self) -> StateFlow<S> {
        StateFlow::new(self.state.clone())
    }

    /// Replace the current state and cache it under its variant tag.
    pub fn set_state(&self, state: S) {
        self.schedule(Command::SetState { state, cache: true });
    }

    /// Replace the current state without touching the cache. Useful for
    /// transient states that should not be restorable.
    pub fn set_state_uncached(&self, state: S) {
        self.schedule(Command::SetState {
            state,
            cache: false,
        });
    }

    /// Transform the current state, which must carry `expected`.
    ///
    /// The reducer may return a state of any variant; the result goes through
    /// [`StateViewModel::set_state`].
    ///
    /// # Panics
    /// Panics when the current state is not of the expected variant, which
    /// means a handler is wired to the wrong state.
    pub fn reduce_state(&self, expected: S::Tag, reducer: impl FnOnce(S) -> S) {
        let current = self.current_state();
        let tag = current.tag();
        if tag != expected {
            panic!("reduce_state failed: current state {tag:?} is not the expected {expected:?}");
        }
        self.set_state(reducer(current));
    }

    /// Restore the most recent cached state of a variant.
    ///
    /// # Panics
    /// Panics when nothing is cached for `tag`.
    pub fn resolve_state(&self, tag: S::Tag) {
        self.resolve_state_with(tag, |state| state);
    }

    /// Restore the most recent cached state of a variant after passing it
    /// through `factory`.
    ///
    /// # Panics
    /// Panics when nothing is cached for `tag`.
    pub fn resolve_state_with(&self, tag: S::Tag, factory: impl FnOnce(S) -> S) {
        let cached = self
            .cache
            .get(&tag)
            .unwrap_or_else(|| panic!("cannot resolve state, no state cached for {tag:?}"));
        self.set_state(factory(cached));
    }

    /// Emit a one-shot UI event to the configured bus, or to the private
    /// channel behind [`StateViewModel::events`] when no bus was supplied.
    pub fn send_ui_event(&self, event: E) {
        self.schedule(Command::SendEvent(event));
    }

    /// Forward a navigation command to the dispatcher. Returns immediately;
    /// the navigation host applies the command on its own time.
    pub fn dispatch_navigation_event(&self, event: NavigationEvent<D>) {
        self.schedule(Command::Navigate(event));
    }

    /// Subscribe to the private event channel.
    ///
    /// With a shared bus configured, events go to the bus instead and this
    /// stream stays silent; observe the bus in that case.
    pub fn events(&self) -> EventStream<E> {
        self.private_events.events()
    }

    /// Run a future on this instance's scope. Everything still running is
    /// aborted when the view model is dropped.
    pub fn spawn(&self, future: impl Future<Output = ()> + Send + 'static) {
        let mut tasks = self.tasks.lock();
        tasks.retain(|task| !task.is_finished());
        tasks.push(self.dispatcher.spawn(future));
    }

    /// Wait until every operation scheduled before this call has applied.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        self.schedule(Command::Flush(tx));
        let _ = rx.await;
    }

    fn schedule(&self, command: Command<S, E, D>) {
        // Send only fails when the worker is gone, i.e. mid-teardown.
        let _ = self.commands.send(command);
    }
}

impl<S: ViewState, E: ViewEvent, D: NavDestination> Drop for StateViewModel<S, E, D> {
    fn drop(&mut self) {
        self.worker.abort();
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }
}

/// Intent routing for a concrete view model.
///
/// `execute_intent` is the single entry point the UI calls; implementations
/// match on the intent and delegate through [`ViewModel::handle_intent`],
/// which gates each handler on the state variant it expects.
pub trait ViewModel {
    type State: ViewState;
    type Intent: fmt::Debug;
    type Event: ViewEvent;
    type Destination: NavDestination;

    /// The state machine this view model drives.
    fn view_model(&self) -> &StateViewModel<Self::State, Self::Event, Self::Destination>;

    /// Route one intent. Called by the UI layer.
    fn execute_intent(&self, intent: Self::Intent);

    /// Called when an intent arrives while the state is not the variant its
    /// handler expects. Override for custom handling.
    ///
    /// # Panics
    /// The default treats the mismatch as a wiring bug and panics.
    fn handle_invalid_state(&self, intent: &Self::Intent) {
        panic!(
            "invalid state {:?} for intent {:?}",
            self.view_model().current_state().tag(),
            intent
        );
    }

    /// Invoke `handler` with the current state if it carries `expected`,
    /// otherwise route to [`ViewModel::handle_invalid_state`].
    fn handle_intent<F>(
        &self,
        expected: <Self::State as ViewState>::Tag,
        intent: Self::Intent,
        handler: F,
    ) where
        Self: Sized,
        F: FnOnce(&Self, Self::State, Self::Intent),
    {
        let current = self.view_model().current_state();
        if current.tag() == expected {
            handler(self, current, intent);
        } else {
            self.handle_invalid_state(&intent);
        }
    }
}

/// A view model that also receives typed navigate-up results.
pub trait NavResultViewModel: ViewModel {
    type NavResult;

    fn on_nav_result_received(&self, result: Self::NavResult);
}
