use common::PaymentId;

use crate::domain::Payment;
use crate::error::ServiceError;

use super::super::PaymentService;

#[derive(Debug, Clone)]
pub struct GetPaymentInput {
    pub payment_id: PaymentId,
}

impl PaymentService {
    #[tracing::instrument(skip(self))]
    pub async fn get_payment(&self, input: GetPaymentInput) -> Result<Payment, ServiceError> {
        self.repository
            .find_by_id(input.payment_id)
            .await?
            .ok_or(ServiceError::NotFound)
    }
}
