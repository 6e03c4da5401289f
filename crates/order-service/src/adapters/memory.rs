use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId, SagaId};
use event_envelope::EventId;
use ports::{OrderRepository, RepositoryError, SagaHistory, SagaLogEntry, SagaLogStore, SagaStatus};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::domain::Order;

/// In-memory order repository, used by tests and as the default adapter
/// when no `DATABASE_URL` is configured.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    type Order = Order;

    async fn save(&self, order: &Order) -> Result<(), RepositoryError> {
        self.orders.write().await.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn find_by_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let orders = self.orders.read().await;
        let mut matches: Vec<Order> = orders
            .values()
            .filter(|o| &o.customer_id == customer_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }
}

struct SagaRecord {
    order_id: OrderId,
    status: SagaStatus,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    events: Vec<SagaLogEntry>,
    logged_event_ids: std::collections::HashSet<EventId>,
}

/// In-memory saga log, keyed by `saga_id`.
#[derive(Clone, Default)]
pub struct InMemorySagaLogStore {
    sagas: Arc<RwLock<HashMap<SagaId, SagaRecord>>>,
}

impl InMemorySagaLogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SagaLogStore for InMemorySagaLogStore {
    async fn start_saga(&self, saga_id: SagaId, order_id: OrderId) -> Result<(), RepositoryError> {
        let mut sagas = self.sagas.write().await;
        sagas.entry(saga_id).or_insert_with(|| SagaRecord {
            order_id,
            status: SagaStatus::Started,
            started_at: Utc::now(),
            ended_at: None,
            events: Vec::new(),
            logged_event_ids: std::collections::HashSet::new(),
        });
        Ok(())
    }

    async fn log_event(
        &self,
        saga_id: SagaId,
        event_id: EventId,
        event_type: &str,
        event_data: Value,
        timestamp: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut sagas = self.sagas.write().await;
        let saga = sagas.get_mut(&saga_id).ok_or(RepositoryError::NotFound)?;
        // `(saga_id, event_id)` is unique: a redelivered event is logged once.
        if !saga.logged_event_ids.insert(event_id) {
            return Ok(());
        }
        saga.events.push(SagaLogEntry {
            event_id,
            event_type: event_type.to_string(),
            event_data,
            timestamp,
        });
        Ok(())
    }

    async fn end_saga(&self, saga_id: SagaId, status: SagaStatus) -> Result<(), RepositoryError> {
        let mut sagas = self.sagas.write().await;
        let saga = sagas.get_mut(&saga_id).ok_or(RepositoryError::NotFound)?;
        if saga.ended_at.is_some() {
            return Ok(());
        }
        saga.status = status;
        saga.ended_at = Some(Utc::now());
        Ok(())
    }

    async fn get_saga_history(
        &self,
        saga_id: SagaId,
    ) -> Result<Option<SagaHistory>, RepositoryError> {
        let sagas = self.sagas.read().await;
        let Some(saga) = sagas.get(&saga_id) else {
            return Ok(None);
        };
        let mut events = saga.events.clone();
        events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(Some(SagaHistory {
            saga_id,
            order_id: saga.order_id,
            status: saga.status,
            started_at: saga.started_at,
            ended_at: saga.ended_at,
            events,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn find_by_customer_sorts_newest_first() {
        use crate::domain::OrderItem;
        use common::{Money, ProductId};

        let repo = InMemoryOrderRepository::new();
        let item = OrderItem {
            product_id: ProductId::new("p1"),
            quantity: 1,
            unit_price: Money::from_dollars(10.0),
        };
        let customer = CustomerId::new("c1");

        let mut first = Order::create(customer.clone(), vec![item.clone()], SagaId::new()).unwrap();
        first.created_at = Utc::now() - chrono::Duration::seconds(10);
        let second = Order::create(customer.clone(), vec![item], SagaId::new()).unwrap();

        repo.save(&first).await.unwrap();
        repo.save(&second).await.unwrap();

        let found = repo.find_by_customer(&customer).await.unwrap();
        assert_eq!(found[0].id, second.id);
        assert_eq!(found[1].id, first.id);
    }

    #[tokio::test]
    async fn log_event_deduplicates_by_event_id() {
        let store = InMemorySagaLogStore::new();
        let saga_id = SagaId::new();
        store.start_saga(saga_id, OrderId::new()).await.unwrap();

        let event_id = EventId::new();
        for _ in 0..3 {
            store
                .log_event(saga_id, event_id, "order_created", Value::Null, Utc::now())
                .await
                .unwrap();
        }

        let history = store.get_saga_history(saga_id).await.unwrap().unwrap();
        assert_eq!(history.events.len(), 1);
    }

    #[tokio::test]
    async fn end_saga_sets_ended_at_once() {
        let store = InMemorySagaLogStore::new();
        let saga_id = SagaId::new();
        store.start_saga(saga_id, OrderId::new()).await.unwrap();
        store.end_saga(saga_id, SagaStatus::Completed).await.unwrap();
        let first_ended = store.get_saga_history(saga_id).await.unwrap().unwrap().ended_at;

        store.end_saga(saga_id, SagaStatus::Failed).await.unwrap();
        let history = store.get_saga_history(saga_id).await.unwrap().unwrap();
        assert_eq!(history.status, SagaStatus::Completed);
        assert_eq!(history.ended_at, first_ended);
    }
}
