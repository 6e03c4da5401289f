use std::collections::HashMap;

use common::{CustomerId, SagaId};
use event_envelope::{EventEnvelope, EventPayload, ItemSnapshot, OrderCreatedPayload, PaymentRequestedPayload};
use serde::{Deserialize, Serialize};

use crate::domain::{Order, OrderItem, OrderStatus};
use crate::error::ServiceError;

use super::super::OrderService;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderInput {
    pub customer_id: CustomerId,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderOutput {
    pub order_id: common::OrderId,
    pub saga_id: SagaId,
    pub status: OrderStatus,
}

impl OrderService {
    /// Validates the order, starts its saga, and emits `OrderCreated`
    /// followed by `PaymentRequested` — the two events a caller observing
    /// the bus should always see arrive together for a newly created order.
    #[tracing::instrument(skip(self, input), fields(customer_id = %input.customer_id))]
    pub async fn create_order(
        &self,
        input: CreateOrderInput,
    ) -> Result<CreateOrderOutput, ServiceError> {
        let saga_id = SagaId::new();
        let mut order = Order::create(input.customer_id.clone(), input.items, saga_id)?;
        let order_id = order.id;

        self.saga_log.start_saga(saga_id, order_id).await?;
        self.repository.save(&order).await?;

        let items: HashMap<_, _> = order
            .items
            .iter()
            .map(|item| {
                (
                    item.product_id.clone(),
                    ItemSnapshot {
                        quantity: item.quantity,
                        unit_price: item.unit_price,
                    },
                )
            })
            .collect();

        self.log_and_publish(
            saga_id,
            EventEnvelope::new(
                EventPayload::OrderCreated(OrderCreatedPayload {
                    order_id,
                    customer_id: order.customer_id.clone(),
                    total_amount: order.total_amount(),
                    items,
                }),
                Some(saga_id),
            ),
        )
        .await?;

        order.start_awaiting_payment();
        self.repository.save(&order).await?;

        self.log_and_publish(
            saga_id,
            EventEnvelope::new(
                EventPayload::PaymentRequested(PaymentRequestedPayload {
                    order_id,
                    customer_id: order.customer_id.clone(),
                    amount: order.total_amount(),
                }),
                Some(saga_id),
            ),
        )
        .await?;

        tracing::info!(%order_id, %saga_id, "order created, saga started");

        Ok(CreateOrderOutput {
            order_id,
            saga_id,
            status: order.status,
        })
    }
}
