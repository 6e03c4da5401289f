use common::{CustomerId, Money, OrderId, SagaId};
use event_envelope::{EventEnvelope, EventPayload, PaymentProcessedPayload};

use crate::domain::{Payment, PaymentMethod};
use crate::error::ServiceError;

use super::super::PaymentService;

#[derive(Debug, Clone)]
pub struct ProcessPaymentInput {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub amount: Money,
    pub saga_id: Option<SagaId>,
}

impl PaymentService {
    /// Triggered by `PaymentRequested`. Charges the gateway and emits
    /// `PaymentProcessed`; a payment already in a terminal state for the
    /// same `(order_id, saga_id)` is re-emitted instead of recharged, so a
    /// redelivered `PaymentRequested` never double-charges.
    #[tracing::instrument(skip(self), fields(order_id = %input.order_id))]
    pub async fn process_payment(&self, input: ProcessPaymentInput) -> Result<(), ServiceError> {
        if let Some(existing) = self
            .repository
            .find_by_order_and_saga(input.order_id, input.saga_id)
            .await?
        {
            if existing.is_terminal() {
                tracing::info!(payment_id = %existing.id, "duplicate payment_requested, re-emitting prior result");
                return self.emit_result(&existing, input.saga_id).await;
            }
        }

        let mut payment = Payment::new(
            input.order_id,
            input.customer_id,
            input.amount,
            PaymentMethod::default(),
            input.saga_id,
        )?;
        self.repository.save(&payment).await?;

        payment.start_processing();
        self.repository.save(&payment).await?;

        let charge_result = self
            .gateway
            .charge(payment.amount, payment.payment_method.as_str())
            .await;

        match charge_result {
            Ok(outcome) if outcome.success => {
                payment.complete(outcome.transaction_id.unwrap_or_default());
            }
            Ok(outcome) => {
                payment.fail(outcome.failure_reason.unwrap_or_else(|| "declined".to_string()));
            }
            Err(error) => {
                payment.fail(format!("Payment processing error: {error}"));
            }
        }
        self.repository.save(&payment).await?;

        self.emit_result(&payment, input.saga_id).await
    }

    async fn emit_result(&self, payment: &Payment, saga_id: Option<SagaId>) -> Result<(), ServiceError> {
        let success = payment.status == crate::domain::PaymentStatus::Completed;
        let message = if success {
            "Payment processed successfully".to_string()
        } else {
            payment
                .metadata
                .get("failure_reason")
                .and_then(|v| v.as_str())
                .unwrap_or("payment failed")
                .to_string()
        };

        let envelope = EventEnvelope::new(
            EventPayload::PaymentProcessed(PaymentProcessedPayload {
                order_id: payment.order_id,
                payment_id: payment.id,
                success,
                message,
            }),
            saga_id,
        );
        self.publish(envelope).await
    }
}
