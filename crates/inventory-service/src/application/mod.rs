pub mod commands;
pub mod event_handlers;
pub mod queries;

use std::sync::Arc;

use event_envelope::EventEnvelope;
use ports::EventBus;

use crate::adapters::outbox::PostgresOutbox;
use crate::domain::Product;
use crate::error::ServiceError;

/// Application layer: commands (triggered by bus events or the synchronous
/// HTTP variant), queries, and the product-seeding command, wired against
/// `ports` traits so the same logic runs over either the in-memory or
/// Postgres adapters.
#[derive(Clone)]
pub struct InventoryService {
    pub(crate) repository: Arc<dyn ports::ProductRepository<Product = Product> + Send + Sync>,
    pub(crate) bus: Arc<dyn EventBus>,
    pub(crate) outbox: Option<Arc<PostgresOutbox>>,
}

impl InventoryService {
    pub fn new(
        repository: Arc<dyn ports::ProductRepository<Product = Product> + Send + Sync>,
        bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            repository,
            bus,
            outbox: None,
        }
    }

    pub fn with_outbox(
        repository: Arc<dyn ports::ProductRepository<Product = Product> + Send + Sync>,
        bus: Arc<dyn EventBus>,
        outbox: Arc<PostgresOutbox>,
    ) -> Self {
        Self {
            repository,
            bus,
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
