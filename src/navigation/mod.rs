//! Navigation commands and their dispatcher.
//!
//! View models produce [`NavigationEvent`] values; exactly one navigation
//! host consumes them and applies them to the real navigation stack. The
//! dispatcher is a drop-oldest broadcast channel and holds no stack state of
//! its own.
//!
//! Destinations are a caller-defined sum type matched exhaustively by the
//! host; results returned while navigating up travel as JSON under a typed
//! [`NavResultKey`].

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::event::{DefaultEventBus, EventBus, EventStream};

/// Marker for destination types a navigation host can resolve.
pub trait NavDestination: Clone + std::fmt::Debug + Send + 'static {}

impl NavDestination for () {}

/// How a `NavigateTo` should manipulate the back stack.
#[derive(Debug, Clone, PartialEq)]
pub struct NavOptions<D> {
    /// Pop the stack back to this destination before navigating.
    pub pop_up_to: Option<D>,
    /// Whether `pop_up_to` removes the target itself as well.
    pub pop_up_to_inclusive: bool,
    /// Reuse an existing top entry for the same destination.
    pub launch_single_top: bool,
}

impl<D> Default for NavOptions<D> {
    fn default() -> Self {
        Self {
            pop_up_to: None,
            pop_up_to_inclusive: false,
            launch_single_top: true,
        }
    }
}

/// Typed key for a result returned to the previous destination.
#[derive(Debug, Clone)]
pub struct NavResultKey<T> {
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> NavResultKey<T> {
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Decode a result payload previously produced under this key.
    pub fn decode(&self, value: &serde_json::Value) -> Option<T> {
        serde_json::from_value(value.clone()).ok()
    }
}

/// A single navigation command.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationEvent<D> {
    /// Push (or single-top reuse) `destination`.
    NavigateTo {
        destination: D,
        options: Option<NavOptions<D>>,
    },
    /// Pop the current destination.
    NavigateUp,
    /// Pop the current destination, handing `value` to the previous one.
    NavigateUpWithResult {
        key: &'static str,
        value: serde_json::Value,
    },
}

impl<D> NavigationEvent<D> {
    pub fn navigate_to(destination: D) -> Self {
        NavigationEvent::NavigateTo {
            destination,
            options: None,
        }
    }

    pub fn navigate_to_with(destination: D, options: NavOptions<D>) -> Self {
        NavigationEvent::NavigateTo {
            destination,
            options: Some(options),
        }
    }

    /// Pop with a typed result.
    ///
    /// # Panics
    /// Panics when `value` cannot be encoded; a result type that does not
    /// serialize is a wiring bug, not a runtime condition.
    pub fn navigate_up_with_result<T: Serialize + DeserializeOwned>(
        key: &NavResultKey<T>,
        value: &T,
    ) -> Self {
        let value = serde_json::to_value(value).unwrap_or_else(|err| {
            panic!(
                "navigation result for key '{}' failed to encode: {err}",
                key.key()
            )
        });
        NavigationEvent::NavigateUpWithResult {
            key: key.key(),
            value,
        }
    }
}

/// Dispatch seam between view models and the navigation host.
pub trait NavigationDispatcher<D: NavDestination>: Send + Sync {
    /// Forward a command to the host. Non-blocking.
    fn dispatch(&self, event: NavigationEvent<D>);

    /// Subscribe to commands dispatched after this call.
    fn events(&self) -> EventStream<NavigationEvent<D>>;
}

/// Default [`NavigationDispatcher`]: a drop-oldest event bus carrying
/// navigation commands, same overflow contract as UI events.
pub struct DefaultNavigationDispatcher<D> {
    bus: DefaultEventBus<NavigationEvent<D>>,
}

impl<D: NavDestination> DefaultNavigationDispatcher<D> {
    pub fn new() -> Self {
        Self {
            bus: DefaultEventBus::new(),
        }
    }
}

impl<D: NavDestination> Default for DefaultNavigationDispatcher<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: NavDestination> NavigationDispatcher<D> for DefaultNavigationDispatcher<D> {
    fn dispatch(&self, event: NavigationEvent<D>) {
        // With no host attached the command has nowhere to go and is dropped.
        self.bus.send_event(event);
    }

    fn events(&self) -> EventStream<NavigationEvent<D>> {
        self.bus.events()
    }
}
