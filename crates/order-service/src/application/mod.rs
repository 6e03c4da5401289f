pub mod commands;
pub mod event_handlers;
pub mod queries;

use std::sync::Arc;

use common::SagaId;
use event_envelope::EventEnvelope;
use ports::{EventBus, SagaLogStore};

use crate::adapters::outbox::PostgresOutbox;
use crate::domain::Order;
use crate::error::ServiceError;

/// Application layer: commands, queries, and bus event handlers, all
/// wired against `ports` traits so the same logic runs over either the
/// in-memory or Postgres adapters.
#[derive(Clone)]
pub struct OrderService {
    pub(crate) repository: Arc<dyn ports::OrderRepository<Order = Order> + Send + Sync>,
    pub(crate) saga_log: Arc<dyn SagaLogStore>,
    pub(crate) bus: Arc<dyn EventBus>,
    pub(crate) outbox: Option<Arc<PostgresOutbox>>,
}

impl OrderService {
    /// Direct-publish mode: every event is handed straight to `bus`. Used by
    /// the in-memory adapter and by tests, where there's no crash-recovery
    /// concern and synchronous observability matters more than durability.
    pub fn new(
        repository: Arc<dyn ports::OrderRepository<Order = Order> + Send + Sync>,
        saga_log: Arc<dyn SagaLogStore>,
        bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            repository,
            saga_log,
            bus,
            outbox: None,
        }
    }

    /// Outbox mode: events are enqueued to the Postgres outbox table instead
    /// of published directly — `bus` is kept only as the eventual transport
    /// used by `adapters::outbox::PostgresOutbox::run_publisher_loop`, which
    /// drains the table on its own schedule. This is the concrete mechanism
    /// behind spec.md §5/§9's "persist and publish must appear atomic"
    /// requirement: a crash after `repository.save` but before the outbox
    /// insert loses only the publish step, never the order itself, and the
    /// background poller is what makes the row durable as seen by the bus.
    pub fn with_outbox(
        repository: Arc<dyn ports::OrderRepository<Order = Order> + Send + Sync>,
        saga_log: Arc<dyn SagaLogStore>,
        bus: Arc<dyn EventBus>,
        outbox: Arc<PostgresOutbox>,
    ) -> Self {
        Self {
            repository,
            saga_log,
            bus,
            outbox: Some(outbox),
        }
    }

    /// Logs an event to the saga's audit trail, then either publishes it
    /// directly or enqueues it to the outbox, depending on which mode this
    /// service was constructed in.
    pub(crate) async fn log_and_publish(
        &self,
        saga_id: SagaId,
        envelope: EventEnvelope,
    ) -> Result<(), ServiceError> {
        let event_data = serde_json::to_value(&envelope.payload)?;
        self.saga_log
            .log_event(
                saga_id,
                envelope.event_id,
                envelope.payload.event_type(),
                event_data,
                envelope.timestamp,
            )
            .await?;
        match &self.outbox {
            Some(outbox) => outbox.enqueue(&envelope).await?,
            None => self.bus.publish(envelope).await?,
        }
        Ok(())
    }
}
