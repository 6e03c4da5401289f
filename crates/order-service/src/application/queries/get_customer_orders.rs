use common::CustomerId;
use serde::Serialize;

use crate::domain::Order;
use crate::error::ServiceError;

use super::super::OrderService;

#[derive(Debug, Clone)]
pub struct GetCustomerOrdersInput {
    pub customer_id: CustomerId,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetCustomerOrdersOutput {
    pub customer_id: CustomerId,
    pub orders: Vec<Order>,
    pub total_orders: usize,
}

impl OrderService {
    /// Orders for one customer, sorted by `created_at` descending — the
    /// repository already returns them in that order.
    #[tracing::instrument(skip(self))]
    pub async fn get_customer_orders(
        &self,
        input: GetCustomerOrdersInput,
    ) -> Result<GetCustomerOrdersOutput, ServiceError> {
        let orders = self
            .repository
            .find_by_customer(&input.customer_id)
            .await?;
        let total_orders = orders.len();

        Ok(GetCustomerOrdersOutput {
            customer_id: input.customer_id,
            orders,
            total_orders,
        })
    }
}
