use common::OrderId;
use event_envelope::{EventEnvelope, EventPayload, OrderCancelledPayload};
use ports::SagaStatus;
use serde::{Deserialize, Serialize};

use crate::domain::OrderStatus;
use crate::error::ServiceError;

use super::super::OrderService;

#[derive(Debug, Clone, Deserialize)]
pub struct CancelOrderInput {
    pub order_id: OrderId,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelOrderOutput {
    pub success: bool,
    pub status: OrderStatus,
}

impl OrderService {
    /// Cancels an order. Re-cancelling an already-cancelled order succeeds
    /// without re-emitting `OrderCancelled` — the idempotent-cancel
    /// invariant. Cancelling a shipped or delivered order is rejected.
    #[tracing::instrument(skip(self, input), fields(order_id = %input.order_id))]
    pub async fn cancel_order(
        &self,
        input: CancelOrderInput,
    ) -> Result<CancelOrderOutput, ServiceError> {
        let mut order = self
            .repository
            .find_by_id(input.order_id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        let transitioned = order.cancel(input.reason.clone())?;
        if !transitioned {
            return Ok(CancelOrderOutput {
                success: true,
                status: order.status,
            });
        }

        self.repository.save(&order).await?;

        if let Some(saga_id) = order.saga_id {
            self.log_and_publish(
                saga_id,
                EventEnvelope::new(
                    EventPayload::OrderCancelled(OrderCancelledPayload {
                        order_id: order.id,
                        reason: input.reason,
                    }),
                    Some(saga_id),
                ),
            )
            .await?;
            self.saga_log.end_saga(saga_id, SagaStatus::Failed).await?;
        }

        tracing::info!(order_id = %order.id, "order cancelled");

        Ok(CancelOrderOutput {
            success: true,
            status: order.status,
        })
    }
}
