use event_envelope::{
    EventEnvelope, EventPayload, InventoryAllocatedPayload, PaymentRefundRequestedPayload,
};
use ports::SagaStatus;

use crate::error::ServiceError;

use super::super::OrderService;

/// Reacts to `InventoryAllocated`. On success, advances the order to
/// `INVENTORY_CONFIRMED` and ends the saga successfully. On failure, marks
/// the order `FAILED`; if the order's payment had already been confirmed,
/// this also publishes `PaymentRefundRequested` — the compensation spec.md
/// §9 flags as a known gap in the original design, fixed here. No-ops if
/// the order is not currently `PENDING_INVENTORY`, and drops the event if
/// the order no longer exists.
#[tracing::instrument(skip(service, payload), fields(order_id = %payload.order_id))]
pub async fn handle_inventory_allocated(
    service: &OrderService,
    payload: InventoryAllocatedPayload,
) -> Result<(), ServiceError> {
    let Some(mut order) = service.repository.find_by_id(payload.order_id).await? else {
        tracing::warn!(order_id = %payload.order_id, "inventory_allocated for unknown order, dropping");
        return Ok(());
    };
    let Some(saga_id) = order.saga_id else {
        tracing::warn!(order_id = %payload.order_id, "order has no saga_id, dropping");
        return Ok(());
    };

    let payment_was_confirmed = order.payment_was_confirmed();
    let refund_amount = order.total_amount();

    let transitioned = order.apply_inventory_allocated(
        payload.success,
        &payload.message,
        payload.allocated_items.clone(),
    );
    if !transitioned {
        tracing::debug!(order_id = %payload.order_id, status = %order.status, "inventory_allocated no-op, order already past PENDING_INVENTORY");
        return Ok(());
    }
    service.repository.save(&order).await?;

    if payload.success {
        service.saga_log.end_saga(saga_id, SagaStatus::Completed).await?;
        tracing::info!(order_id = %order.id, %saga_id, "inventory allocated, saga completed");
        return Ok(());
    }

    if payment_was_confirmed {
        service
            .log_and_publish(
                saga_id,
                EventEnvelope::new(
                    EventPayload::PaymentRefundRequested(PaymentRefundRequestedPayload {
                        order_id: order.id,
                        payment_id: None,
                        amount: refund_amount,
                        reason: format!("inventory allocation failed: {}", payload.message),
                    }),
                    Some(saga_id),
                ),
            )
            .await?;
        tracing::info!(order_id = %order.id, %saga_id, "inventory allocation failed after payment, refund requested");
    }

    service.saga_log.end_saga(saga_id, SagaStatus::Failed).await?;
    tracing::info!(order_id = %order.id, %saga_id, reason = %payload.message, "inventory allocation failed, saga ended");

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use bus::InMemoryEventBus;
    use common::{CustomerId, Money, ProductId, SagaId};

    use super::*;
    use crate::adapters::{InMemoryOrderRepository, InMemorySagaLogStore};
    use crate::domain::{Order, OrderItem, OrderStatus};

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

    async fn seed_pending_inventory_order(
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
        order.apply_payment_processed(true, "ok");
        order.start_awaiting_inventory();
        saga_log.start_saga(saga_id, order.id).await.unwrap();
        repo.save(&order).await.unwrap();
        order
    }

    #[tokio::test]
    async fn success_confirms_inventory_and_completes_saga() {
        let (service, repo, saga_log) = service();
        let order = seed_pending_inventory_order(&repo, &saga_log).await;

        handle_inventory_allocated(
            &service,
            InventoryAllocatedPayload {
                order_id: order.id,
                success: true,
                message: "ok".into(),
                allocated_items: HashMap::from([(ProductId::new("p1"), 2)]),
            },
        )
        .await
        .unwrap();

        let reloaded = repo.find_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, OrderStatus::InventoryConfirmed);

        let history = saga_log
            .get_saga_history(order.saga_id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(history.status, SagaStatus::Completed);
    }

    #[tokio::test]
    async fn failure_after_payment_confirmed_requests_refund() {
        let (service, repo, saga_log) = service();
        let order = seed_pending_inventory_order(&repo, &saga_log).await;

        let mut sub = service.bus.subscribe(event_envelope::Topic::Payments).await.unwrap();

        handle_inventory_allocated(
            &service,
            InventoryAllocatedPayload {
                order_id: order.id,
                success: false,
                message: "Insufficient quantity for product p2".into(),
                allocated_items: HashMap::new(),
            },
        )
        .await
        .unwrap();

        let reloaded = repo.find_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, OrderStatus::Failed);

        let event = sub.recv().await.unwrap();
        match event.payload {
            EventPayload::PaymentRefundRequested(p) => {
                assert_eq!(p.order_id, order.id);
                assert_eq!(p.amount, Money::from_dollars(20.0));
            }
            other => panic!("expected PaymentRefundRequested, got {other:?}"),
        }
    }
}
