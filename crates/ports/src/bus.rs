use std::sync::Arc;

use async_trait::async_trait;
use event_envelope::{EventEnvelope, Topic};

use crate::BusError;

/// The message bus. Stands in for the out-of-scope broker (Pulsar, Kafka,
/// ...); the only adapter in this workspace is the in-memory one in `bus`.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publishes an event to its topic. Delivery is at-least-once: a
    /// successful return means the event has been handed to every
    /// subscription active at publish time, not that handlers have run.
    async fn publish(&self, envelope: EventEnvelope) -> Result<(), BusError>;

    /// Subscribes to a topic, returning a handle that yields every event
    /// published to it from this point on.
    async fn subscribe(&self, topic: Topic) -> Result<Box<dyn Subscription>, BusError>;
}

/// Lets an `Arc<dyn EventBus>` be passed anywhere a concrete `EventBus` is
/// expected, e.g. into a generic `impl EventBus` parameter.
#[async_trait]
impl EventBus for Arc<dyn EventBus> {
    async fn publish(&self, envelope: EventEnvelope) -> Result<(), BusError> {
        (**self).publish(envelope).await
    }

    async fn subscribe(&self, topic: Topic) -> Result<Box<dyn Subscription>, BusError> {
        (**self).subscribe(topic).await
    }
}

/// A live subscription to one topic.
#[async_trait]
pub trait Subscription: Send {
    /// Waits for the next event. Returns `None` once the bus has shut down
    /// and no further events will arrive.
    async fn recv(&mut self) -> Option<EventEnvelope>;
}
