use std::collections::HashMap;

use event_envelope::{EventEnvelope, EventPayload, InventoryRequestedPayload, PaymentProcessedPayload};
use ports::SagaStatus;

use crate::error::ServiceError;

use super::super::OrderService;

/// Reacts to `PaymentProcessed`. On success, advances the order to
/// `PENDING_INVENTORY` and emits `InventoryRequested`; on failure, ends the
/// saga as failed. No-ops if the order has already moved past
/// `PENDING_PAYMENT` — the idempotent-handler requirement for at-least-once
/// delivery — and drops the event entirely if the order no longer exists.
#[tracing::instrument(skip(service, payload), fields(order_id = %payload.order_id))]
pub async fn handle_payment_processed(
    service: &OrderService,
    payload: PaymentProcessedPayload,
) -> Result<(), ServiceError> {
    let Some(mut order) = service.repository.find_by_id(payload.order_id).await? else {
        tracing::warn!(order_id = %payload.order_id, "payment_processed for unknown order, dropping");
        return Ok(());
    };
    let Some(saga_id) = order.saga_id else {
        tracing::warn!(order_id = %payload.order_id, "order has no saga_id, dropping");
        return Ok(());
    };

    if !order.apply_payment_processed(payload.success, &payload.message) {
        tracing::debug!(order_id = %payload.order_id, status = %order.status, "payment_processed no-op, order already past PENDING_PAYMENT");
        return Ok(());
    }
    service.repository.save(&order).await?;

    if payload.success {
        order.start_awaiting_inventory();
        service.repository.save(&order).await?;

        let items: HashMap<_, _> = order
            .items
            .iter()
            .map(|item| (item.product_id.clone(), item.quantity))
            .collect();

        service
            .log_and_publish(
                saga_id,
                EventEnvelope::new(
                    EventPayload::InventoryRequested(InventoryRequestedPayload {
                        order_id: order.id,
                        items,
                    }),
                    Some(saga_id),
                ),
            )
            .await?;

        tracing::info!(order_id = %order.id, %saga_id, "payment confirmed, inventory requested");
    } else {
        service.saga_log.end_saga(saga_id, SagaStatus::Failed).await?;
        tracing::info!(order_id = %order.id, %saga_id, reason = %payload.message, "payment failed, saga ended");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bus::InMemoryEventBus;
    use common::{CustomerId, Money, ProductId, SagaId};

    use super::*;
    use crate::adapters::{InMemoryOrderRepository, InMemorySagaLogStore};
    use crate::domain::{Order, OrderItem};

    fn service() -> (OrderService, Arc<InMemoryOrderRepository>, Arc<InMemorySagaLogStore>) {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let saga_log = Arc::new(InMemorySagaLogStore::new());
        let bus = Arc::new(InMemoryEventBus::new());
        (
            OrderService::new(repo.clone(), saga_log.clone(), bus),
            repo,
            saga_log,
        )
    }

    async fn seed_pending_payment_order(
        repo: &InMemoryOrderRepository,
        saga_log: &InMemorySagaLogStore,
    ) -> Order {
        let saga_id = SagaId::new();
        let mut order = Order::create(
            CustomerId::new("c1"),
            vec![OrderItem {
                product_id: ProductId::new("p1"),
                quantity: 2,
                unit_price: Money::from_dollars(10.0),
            }],
            saga_id,
        )
        .unwrap();
        order.start_awaiting_payment();
        saga_log.start_saga(saga_id, order.id).await.unwrap();
        repo.save(&order).await.unwrap();
        order
    }

    #[tokio::test]
    async fn success_advances_to_pending_inventory_and_requests_allocation() {
        let (service, repo, _saga_log) = service();
        let order = seed_pending_payment_order(&repo, &service.saga_log).await;

        handle_payment_processed(
            &service,
            PaymentProcessedPayload {
                order_id: order.id,
                payment_id: common::PaymentId::new(),
                success: true,
                message: "ok".into(),
            },
        )
        .await
        .unwrap();

        let reloaded = repo.find_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, crate::domain::OrderStatus::PendingInventory);
    }

    #[tokio::test]
    async fn failure_marks_order_failed_and_ends_saga() {
        let (service, repo, saga_log) = service();
        let order = seed_pending_payment_order(&repo, &saga_log).await;

        handle_payment_processed(
            &service,
            PaymentProcessedPayload {
                order_id: order.id,
                payment_id: common::PaymentId::new(),
                success: false,
                message: "Card declined".into(),
            },
        )
        .await
        .unwrap();

        let reloaded = repo.find_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, crate::domain::OrderStatus::Failed);
        assert_eq!(
            reloaded.metadata.get("payment_failure_reason").unwrap(),
            "Card declined"
        );

        let history = saga_log
            .get_saga_history(order.saga_id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(history.status, SagaStatus::Failed);
    }

    #[tokio::test]
    async fn duplicate_delivery_is_a_no_op() {
        let (service, repo, _saga_log) = service();
        let order = seed_pending_payment_order(&repo, &service.saga_log).await;
        let event = PaymentProcessedPayload {
            order_id: order.id,
            payment_id: common::PaymentId::new(),
            success: true,
            message: "ok".into(),
        };

        handle_payment_processed(&service, event.clone()).await.unwrap();
        handle_payment_processed(&service, event).await.unwrap();

        let reloaded = repo.find_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, crate::domain::OrderStatus::PendingInventory);
    }
}
