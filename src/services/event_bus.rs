//! EventBus service for in-process fan-out of push events.
//!
//! Subscribers register a handler and receive a [`Subscription`] token that
//! must be handed back to [`EventBus::unsubscribe`]. Dispatch is synchronous:
//! `publish` calls every handler that was registered when dispatch started,
//! in registration order, before returning. Nothing is buffered or replayed.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::PushEvent;

/// Monotonically increasing sequence number assigned by EventBus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceNumber(pub u64);

impl SequenceNumber {
    /// Sequence before the first event.
    pub fn zero() -> Self {
        Self(0)
    }
}

impl std::fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub Uuid);

impl SubscriptionId {
    /// Fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

/// What travels on the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// The push channel reached (`true`) or lost (`false`) the connected state.
    Connectivity(bool),
    /// A decoded server push.
    Push(PushEvent),
}

/// Envelope handed to handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct BusEvent {
    /// Position in publish order.
    pub sequence: SequenceNumber,
    /// Wall-clock time of publishing.
    pub published_at: DateTime<Utc>,
    /// The event itself.
    pub payload: FeedEvent,
}

/// Receiver side of the bus.
///
/// Handlers run on the publisher's task and must not block or await; work
/// that needs I/O is forwarded to the subscriber's own worker.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &BusEvent);
}

impl<F> EventHandler for F
where
    F: Fn(&BusEvent) + Send + Sync,
{
    fn handle(&self, event: &BusEvent) {
        self(event);
    }
}

/// Token proving a live registration; consumed by `unsubscribe`.
#[derive(Debug, PartialEq, Eq, Hash)]
#[must_use = "dropping a subscription token leaks the handler registration"]
pub struct Subscription {
    id: SubscriptionId,
}

impl Subscription {
    /// Id of the registration.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

/// Central event bus for broadcasting feed events to multiple consumers.
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<Vec<(SubscriptionId, Arc<dyn EventHandler>)>>,
    sequence: AtomicU64,
}

impl EventBus {
    /// Create a bus with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for every subsequently published event.
    pub fn subscribe(&self, handler: impl EventHandler + 'static) -> Subscription {
        let id = SubscriptionId::new();
        self.handlers.write().push((id, Arc::new(handler)));
        tracing::debug!(subscription = %id.0, "event bus subscriber added");
        Subscription { id }
    }

    /// Remove a registration. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(id, _)| *id != subscription.id);
        let removed = handlers.len() != before;
        tracing::debug!(subscription = %subscription.id.0, removed, "event bus subscriber removed");
        removed
    }

    /// Publish an event to every current subscriber.
    pub fn publish(&self, payload: FeedEvent) -> SequenceNumber {
        let sequence = SequenceNumber(self.sequence.fetch_add(1, Ordering::SeqCst));
        let event = BusEvent {
            sequence,
            published_at: Utc::now(),
            payload,
        };

        // Snapshot so handlers may (un)subscribe without deadlocking.
        let snapshot: Vec<Arc<dyn EventHandler>> = self
            .handlers
            .read()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in snapshot {
            handler.handle(&event);
        }
        sequence
    }

    /// Publish a decoded push event.
    pub fn publish_push(&self, event: PushEvent) -> SequenceNumber {
        self.publish(FeedEvent::Push(event))
    }

    /// Publish a channel up/down transition.
    pub fn publish_connectivity(&self, connected: bool) -> SequenceNumber {
        self.publish(FeedEvent::Connectivity(connected))
    }

    /// Get the next sequence number to be assigned.
    pub fn current_sequence(&self) -> SequenceNumber {
        SequenceNumber(self.sequence.load(Ordering::SeqCst))
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }
}
