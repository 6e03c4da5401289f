use event_envelope::OrderShippedPayload;

use crate::error::ServiceError;

use super::super::OrderService;

/// Reacts to `OrderShipped`: records the tracking number and advances the
/// order to `SHIPPED`. No component in this workspace publishes this event
/// on its own initiative (spec.md §9 notes the same gap in the original);
/// it is reachable only via `POST /orders/{id}/ship`, the stand-in for an
/// external dispatcher. No-ops if the order is not `INVENTORY_CONFIRMED`,
/// drops the event if the order no longer exists.
#[tracing::instrument(skip(service, payload), fields(order_id = %payload.order_id))]
pub async fn handle_order_shipped(
    service: &OrderService,
    payload: OrderShippedPayload,
) -> Result<(), ServiceError> {
    let Some(mut order) = service.repository.find_by_id(payload.order_id).await? else {
        tracing::warn!(order_id = %payload.order_id, "order_shipped for unknown order, dropping");
        return Ok(());
    };

    if !order.apply_shipped(&payload.tracking_number) {
        tracing::debug!(order_id = %payload.order_id, status = %order.status, "order_shipped no-op, order not INVENTORY_CONFIRMED");
        return Ok(());
    }
    service.repository.save(&order).await?;
    tracing::info!(order_id = %order.id, tracking_number = %payload.tracking_number, "order shipped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bus::InMemoryEventBus;
    use common::{CustomerId, Money, ProductId, SagaId};

    use super::*;
    use crate::adapters::{InMemoryOrderRepository, InMemorySagaLogStore};
    use crate::domain::{Order, OrderItem, OrderStatus};

    #[tokio::test]
    async fn records_tracking_number_and_advances_to_shipped() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let saga_log = Arc::new(InMemorySagaLogStore::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let service = OrderService::new(repo.clone(), saga_log, bus);

        let mut order = Order::create(
            CustomerId::new("c1"),
            vec![OrderItem {
                product_id: ProductId::new("p1"),
                quantity: 1,
                unit_price: Money::from_dollars(10.0),
            }],
            SagaId::new(),
        )
        .unwrap();
        order.status = OrderStatus::InventoryConfirmed;
        repo.save(&order).await.unwrap();

        handle_order_shipped(
            &service,
            OrderShippedPayload {
                order_id: order.id,
                tracking_number: "1Z999".into(),
            },
        )
        .await
        .unwrap();

        let reloaded = repo.find_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, OrderStatus::Shipped);
        assert_eq!(
            reloaded.metadata.get("tracking_number").unwrap(),
            "1Z999"
        );
    }
}
