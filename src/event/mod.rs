//! One-shot event delivery.
//!
//! Events are signals independent of state (transient messages, prompts).
//! Delivery is broadcast with a small drop-oldest buffer: a slow or absent
//! subscriber loses the oldest pending events, never blocks the producer, and
//! a late subscriber sees nothing retroactively.
//!
//! The buffer is a per-subscriber ring guarded by a mutex rather than a tokio
//! broadcast channel, which rounds its capacity up to a power of two and
//! would silently widen the overflow window.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

/// Buffered events retained per subscriber before the oldest is dropped.
pub const EVENT_BUFFER_CAPACITY: usize = 5;

/// Shared bus for one-shot events.
///
/// Implementations must be broadcast (every subscriber sees every retained
/// event) and must never block the sender. Custom implementations typically
/// wrap a [`DefaultEventBus`], which is the only way to mint an
/// [`EventStream`].
pub trait EventBus<E: Clone + Send + 'static>: Send + Sync {
    /// Publish an event. Non-blocking; with no live subscriber the event is
    /// discarded.
    fn send_event(&self, event: E);

    /// Subscribe to events published after this call.
    fn events(&self) -> EventStream<E>;
}

struct Subscriber<E> {
    queue: Mutex<VecDeque<E>>,
    notify: Notify,
}

struct Shared<E> {
    subscribers: Mutex<Vec<Arc<Subscriber<E>>>>,
    closed: AtomicBool,
}

/// Default [`EventBus`]: drop-oldest ring of [`EVENT_BUFFER_CAPACITY`] events
/// per subscriber.
pub struct DefaultEventBus<E> {
    shared: Arc<Shared<E>>,
}

impl<E: Clone + Send + 'static> DefaultEventBus<E> {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                subscribers: Mutex::new(Vec::new()),
                closed: AtomicBool::new(false),
            }),
        }
    }
}

impl<E: Clone + Send + 'static> Default for DefaultEventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone + Send + 'static> EventBus<E> for DefaultEventBus<E> {
    fn send_event(&self, event: E) {
        let mut subscribers = self.shared.subscribers.lock();
        // A subscriber only the list still references has been dropped.
        subscribers.retain(|subscriber| Arc::strong_count(subscriber) > 1);

        for subscriber in subscribers.iter() {
            let mut queue = subscriber.queue.lock();
            if queue.len() == EVENT_BUFFER_CAPACITY {
                queue.pop_front();
                tracing::warn!("event subscriber lagged, oldest event dropped");
            }
            queue.push_back(event.clone());
            drop(queue);
            subscriber.notify.notify_one();
        }
    }

    fn events(&self) -> EventStream<E> {
        let subscriber = Arc::new(Subscriber {
            queue: Mutex::new(VecDeque::with_capacity(EVENT_BUFFER_CAPACITY)),
            notify: Notify::new(),
        });
        self.shared.subscribers.lock().push(Arc::clone(&subscriber));
        EventStream {
            shared: Arc::clone(&self.shared),
            subscriber,
        }
    }
}

impl<E> Drop for DefaultEventBus<E> {
    fn drop(&mut self) {
        self.shared.closed.store(true, Ordering::SeqCst);
        for subscriber in self.shared.subscribers.lock().iter() {
            subscriber.notify.notify_one();
        }
    }
}

/// Subscriber handle yielding events in publish order.
pub struct EventStream<E> {
    shared: Arc<Shared<E>>,
    subscriber: Arc<Subscriber<E>>,
}

impl<E: Clone + Send + 'static> EventStream<E> {
    /// Next event, or `None` once the bus is gone and the buffer is drained.
    pub async fn next(&mut self) -> Option<E> {
        loop {
            // Subscribe to the notifier BEFORE checking the queue, so a send
            // landing between the check and the await cannot be missed.
            let notified = self.subscriber.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(event) = self.subscriber.queue.lock().pop_front() {
                return Some(event);
            }
            if self.shared.closed.load(Ordering::SeqCst) {
                return None;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_six_sends_drop_the_oldest() {
        let bus: DefaultEventBus<u32> = DefaultEventBus::new();
        let mut events = bus.events();

        for n in 1..=6 {
            bus.send_event(n);
        }

        // The first event was dropped; the latest five arrive in order.
        for expected in 2..=6 {
            assert_eq!(events.next().await, Some(expected));
        }
    }

    #[tokio::test]
    async fn test_overflow_drops_exactly_the_overage() {
        let bus: DefaultEventBus<u32> = DefaultEventBus::new();
        let mut events = bus.events();

        for n in 1..=7 {
            bus.send_event(n);
        }

        for expected in 3..=7 {
            assert_eq!(events.next().await, Some(expected));
        }
    }

    #[tokio::test]
    async fn test_delivery_preserves_order_within_buffer() {
        let bus: DefaultEventBus<&str> = DefaultEventBus::new();
        let mut events = bus.events();

        bus.send_event("a");
        bus.send_event("b");
        assert_eq!(events.next().await, Some("a"));
        assert_eq!(events.next().await, Some("b"));
    }

    #[tokio::test]
    async fn test_no_replay_for_late_subscribers() {
        let bus: DefaultEventBus<u32> = DefaultEventBus::new();
        let _early = bus.events();

        bus.send_event(1);
        let mut late = bus.events();
        bus.send_event(2);

        assert_eq!(late.next().await, Some(2));
    }

    #[tokio::test]
    async fn test_every_subscriber_sees_every_event() {
        let bus: DefaultEventBus<u32> = DefaultEventBus::new();
        let mut first = bus.events();
        let mut second = bus.events();

        bus.send_event(7);
        assert_eq!(first.next().await, Some(7));
        assert_eq!(second.next().await, Some(7));
    }

    #[tokio::test]
    async fn test_stream_ends_when_bus_dropped() {
        let bus: DefaultEventBus<u32> = DefaultEventBus::new();
        let mut events = bus.events();
        bus.send_event(9);
        drop(bus);

        // Buffered events still drain before the stream ends.
        assert_eq!(events.next().await, Some(9));
        assert_eq!(events.next().await, None);
    }

    #[tokio::test]
    async fn test_send_with_no_subscribers_is_discarded() {
        let bus: DefaultEventBus<u32> = DefaultEventBus::new();
        bus.send_event(1);

        let mut late = bus.events();
        bus.send_event(2);
        assert_eq!(late.next().await, Some(2));
    }
}
