//! In-memory `EventBus` adapter, standing in for the out-of-scope broker.
//!
//! Each subscriber owns a fixed number of ordered lanes; a publish hashes
//! the envelope's partition key (`saga_id`, falling back to `order_id`) into
//! one lane per subscriber, so events for one saga are always delivered to
//! a given subscriber in publish order, while unrelated sagas can be
//! delivered out of order relative to each other.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use event_envelope::{EventEnvelope, Topic};
use ports::{BusError, EventBus, Subscription};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, warn};

const LANE_COUNT: usize = 8;

struct TopicSubscriber {
    lanes: Vec<mpsc::UnboundedSender<EventEnvelope>>,
}

/// In-memory, partitioned, at-least-once event bus.
#[derive(Clone, Default)]
pub struct InMemoryEventBus {
    subscribers: Arc<RwLock<HashMap<Topic, Vec<TopicSubscriber>>>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lane_for(partition_key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        partition_key.hash(&mut hasher);
        (hasher.finish() as usize) % LANE_COUNT
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, envelope: EventEnvelope) -> Result<(), BusError> {
        let topic = envelope.topic();
        let lane = Self::lane_for(&envelope.partition_key());

        let subscribers = self.subscribers.read().await;
        let Some(topic_subscribers) = subscribers.get(&topic) else {
            debug!(%topic, event_type = envelope.payload.event_type(), "no subscribers for topic");
            return Ok(());
        };

        for subscriber in topic_subscribers {
            if let Some(sender) = subscriber.lanes.get(lane)
                && sender.send(envelope.clone()).is_err()
            {
                warn!(%topic, "subscriber lane closed, dropping event");
            }
        }
        Ok(())
    }

    async fn subscribe(&self, topic: Topic) -> Result<Box<dyn Subscription>, BusError> {
        let mut senders = Vec::with_capacity(LANE_COUNT);
        let mut receivers = Vec::with_capacity(LANE_COUNT);
        for _ in 0..LANE_COUNT {
            let (tx, rx) = mpsc::unbounded_channel();
            senders.push(tx);
            receivers.push(rx);
        }

        let mut subscribers = self.subscribers.write().await;
        subscribers
            .entry(topic)
            .or_default()
            .push(TopicSubscriber { lanes: senders });

        Ok(Box::new(InMemorySubscription { receivers }))
    }
}

struct InMemorySubscription {
    receivers: Vec<mpsc::UnboundedReceiver<EventEnvelope>>,
}

#[async_trait]
impl Subscription for InMemorySubscription {
    async fn recv(&mut self) -> Option<EventEnvelope> {
        loop {
            if self.receivers.is_empty() {
                return None;
            }
            let (result, index, _) = futures_util::future::select_all(
                self.receivers.iter_mut().map(|rx| Box::pin(rx.recv())),
            )
            .await;
            match result {
                Some(envelope) => return Some(envelope),
                None => {
                    self.receivers.remove(index);
                    if self.receivers.is_empty() {
                        return None;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{CustomerId, OrderId, SagaId};
    use event_envelope::{EventPayload, OrderCancelledPayload, PaymentRequestedPayload};

    #[tokio::test]
    async fn delivers_published_event_to_subscriber() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(Topic::Orders).await.unwrap();

        let order_id = OrderId::new();
        let envelope = EventEnvelope::new(
            EventPayload::OrderCancelled(OrderCancelledPayload {
                order_id,
                reason: "test".into(),
            }),
            None,
        );
        bus.publish(envelope.clone()).await.unwrap();

        let received = sub.recv().await.unwrap();
        assert_eq!(received.event_id, envelope.event_id);
    }

    #[tokio::test]
    async fn does_not_deliver_across_topics() {
        let bus = InMemoryEventBus::new();
        let mut orders_sub = bus.subscribe(Topic::Orders).await.unwrap();

        let envelope = EventEnvelope::new(
            EventPayload::PaymentRequested(PaymentRequestedPayload {
                order_id: OrderId::new(),
                customer_id: CustomerId::new("c1"),
                amount: common::Money::from_dollars(10.0),
            }),
            None,
        );
        bus.publish(envelope).await.unwrap();

        let result = tokio::time::timeout(std::time::Duration::from_millis(50), orders_sub.recv()).await;
        assert!(result.is_err(), "no event should arrive on an unrelated topic");
    }

    #[tokio::test]
    async fn preserves_order_within_one_saga() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(Topic::Orders).await.unwrap();
        let saga_id = SagaId::new();
        let order_id = OrderId::new();

        for reason in ["first", "second", "third"] {
            let envelope = EventEnvelope::new(
                EventPayload::OrderCancelled(OrderCancelledPayload {
                    order_id,
                    reason: reason.into(),
                }),
                Some(saga_id),
            );
            bus.publish(envelope).await.unwrap();
        }

        for expected in ["first", "second", "third"] {
            let received = sub.recv().await.unwrap();
            match received.payload {
                EventPayload::OrderCancelled(p) => assert_eq!(p.reason, expected),
                _ => panic!("unexpected payload"),
            }
        }
    }
}
