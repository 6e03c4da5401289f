use chrono::{DateTime, Utc};
use common::SagaId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EventPayload, Topic};

/// Unique identifier for a published event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An event as it travels the bus: header fields flattened alongside the
/// tagged payload, matching the `{event_id, event_type, timestamp, saga_id?,
/// ...payload}` wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: EventId,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub saga_id: Option<SagaId>,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl EventEnvelope {
    /// Wraps a payload with a fresh event ID and the current time.
    pub fn new(payload: EventPayload, saga_id: Option<SagaId>) -> Self {
        Self {
            event_id: EventId::new(),
            timestamp: Utc::now(),
            saga_id,
            payload,
        }
    }

    /// The topic this envelope should be published on.
    pub fn topic(&self) -> Topic {
        self.payload.topic()
    }

    /// The partition key for ordered delivery: `saga_id` when present,
    /// falling back to `order_id` per spec.
    pub fn partition_key(&self) -> String {
        match self.saga_id {
            Some(saga_id) => saga_id.to_string(),
            None => self.payload.order_id().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::OrderCancelledPayload;
    use common::OrderId;

    #[test]
    fn omits_saga_id_when_absent() {
        let envelope = EventEnvelope::new(
            EventPayload::OrderCancelled(OrderCancelledPayload {
                order_id: OrderId::new(),
                reason: "r".into(),
            }),
            None,
        );
        let json = serde_json::to_value(&envelope).unwrap();
        assert!(json.get("saga_id").is_none());
    }

    #[test]
    fn partition_key_falls_back_to_order_id() {
        let order_id = OrderId::new();
        let envelope = EventEnvelope::new(
            EventPayload::OrderCancelled(OrderCancelledPayload {
                order_id,
                reason: "r".into(),
            }),
            None,
        );
        assert_eq!(envelope.partition_key(), order_id.to_string());
    }

    #[test]
    fn partition_key_prefers_saga_id() {
        let saga_id = SagaId::new();
        let envelope = EventEnvelope::new(
            EventPayload::OrderCancelled(OrderCancelledPayload {
                order_id: OrderId::new(),
                reason: "r".into(),
            }),
            Some(saga_id),
        );
        assert_eq!(envelope.partition_key(), saga_id.to_string());
    }
}
