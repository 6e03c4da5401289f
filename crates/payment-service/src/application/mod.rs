pub mod commands;
pub mod event_handlers;
pub mod queries;

use std::sync::Arc;

use event_envelope::EventEnvelope;
use ports::{EventBus, PaymentGateway};

use crate::adapters::outbox::PostgresOutbox;
use crate::domain::Payment;
use crate::error::ServiceError;

/// Application layer: commands (triggered by bus events) and queries, wired
/// against `ports` traits so the same logic runs over either the in-memory
/// or Postgres adapters.
#[derive(Clone)]
pub struct PaymentService {
    pub(crate) repository: Arc<dyn ports::PaymentRepository<Payment = Payment> + Send + Sync>,
    pub(crate) bus: Arc<dyn EventBus>,
    pub(crate) gateway: Arc<dyn PaymentGateway>,
    pub(crate) outbox: Option<Arc<PostgresOutbox>>,
}

impl PaymentService {
    /// Direct-publish mode: every event is handed straight to `bus`.
    pub fn new(
        repository: Arc<dyn ports::PaymentRepository<Payment = Payment> + Send + Sync>,
        bus: Arc<dyn EventBus>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            repository,
            bus,
            gateway,
            outbox: None,
        }
    }

    /// Outbox mode: events are enqueued to the Postgres outbox table rather
    /// than published directly; `bus` is kept only as the eventual
    /// transport used by `adapters::outbox::PostgresOutbox::run_publisher_loop`.
    pub fn with_outbox(
        repository: Arc<dyn ports::PaymentRepository<Payment = Payment> + Send + Sync>,
        bus: Arc<dyn EventBus>,
        gateway: Arc<dyn PaymentGateway>,
        outbox: Arc<PostgresOutbox>,
    ) -> Self {
        Self {
            repository,
            bus,
            gateway,
            outbox: Some(outbox),
        }
    }

    pub(crate) async fn publish(&self, envelope: EventEnvelope) -> Result<(), ServiceError> {
        match &self.outbox {
            Some(outbox) => outbox.enqueue(&envelope).await?,
            None => self.bus.publish(envelope).await?,
        }
        Ok(())
    }
}
