use common::OrderId;
use ports::SagaHistory;
use serde::Serialize;

use crate::domain::Order;
use crate::error::ServiceError;

use super::super::OrderService;

#[derive(Debug, Clone)]
pub struct GetOrderInput {
    pub order_id: OrderId,
    pub include_saga_history: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderSnapshot {
    #[serde(flatten)]
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saga_history: Option<SagaHistory>,
}

impl OrderService {
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, input: GetOrderInput) -> Result<OrderSnapshot, ServiceError> {
        let order = self
            .repository
            .find_by_id(input.order_id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        let saga_history = if input.include_saga_history {
            match order.saga_id {
                Some(saga_id) => self.saga_log.get_saga_history(saga_id).await?,
                None => None,
            }
        } else {
            None
        };

        Ok(OrderSnapshot {
            order,
            saga_history,
        })
    }
}
