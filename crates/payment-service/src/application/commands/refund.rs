use common::{Money, OrderId, SagaId};
use event_envelope::{EventEnvelope, EventPayload, PaymentRefundedPayload};

use crate::domain::PaymentStatus;
use crate::error::ServiceError;

use super::super::PaymentService;

#[derive(Debug, Clone)]
pub struct RefundInput {
    pub order_id: OrderId,
    pub amount: Money,
    pub reason: String,
    pub saga_id: Option<SagaId>,
}

impl PaymentService {
    /// Triggered by `PaymentRefundRequested`, itself published only when a
    /// downstream step (inventory allocation) fails after payment already
    /// completed. The request carries no `payment_id` — the publisher
    /// never tracked it — so the completed payment for `order_id` is
    /// resolved here instead.
    #[tracing::instrument(skip(self), fields(order_id = %input.order_id))]
    pub async fn refund(&self, input: RefundInput) -> Result<(), ServiceError> {
        let Some(mut payment) = self
            .repository
            .find_by_order_and_saga(input.order_id, input.saga_id)
            .await?
        else {
            tracing::warn!("refund requested for an order with no known payment, dropping");
            return Ok(());
        };

        if payment.status == PaymentStatus::Refunded {
            tracing::info!(payment_id = %payment.id, "duplicate refund request, already refunded");
            return Ok(());
        }
        if payment.status != PaymentStatus::Completed {
            tracing::warn!(
                payment_id = %payment.id,
                status = %payment.status,
                "refund requested for a payment that was never completed, dropping"
            );
            return Ok(());
        }

        let transaction_id = payment.transaction_id.clone().unwrap_or_default();
        let gateway_outcome = self.gateway.refund(&transaction_id, input.amount).await?;
        if !gateway_outcome.success {
            tracing::error!(
                payment_id = %payment.id,
                reason = ?gateway_outcome.failure_reason,
                "gateway refused refund"
            );
            return Ok(());
        }

        payment.refund(input.reason.clone())?;
        self.repository.save(&payment).await?;

        let envelope = EventEnvelope::new(
            EventPayload::PaymentRefunded(PaymentRefundedPayload {
                order_id: payment.order_id,
                payment_id: payment.id,
                amount: input.amount,
                reason: input.reason,
            }),
            input.saga_id,
        );
        self.publish(envelope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryPaymentRepository;
    use crate::adapters::mock_gateway::MockPaymentGateway;
    use crate::domain::{Payment, PaymentMethod};
    use bus::InMemoryEventBus;
    use common::CustomerId;
    use event_envelope::Topic;
    use ports::{EventBus, PaymentRepository};
    use std::sync::Arc;

    async fn completed_payment(repo: &InMemoryPaymentRepository, order_id: OrderId) -> Payment {
        let mut payment = Payment::new(
            order_id,
            CustomerId::new("c1"),
            Money::from_dollars(40.0),
            PaymentMethod::CreditCard,
            None,
        )
        .unwrap();
        payment.start_processing();
        payment.complete("txn_abc");
        repo.save(&payment).await.unwrap();
        payment
    }

    #[tokio::test]
    async fn refunds_completed_payment_and_emits_event() {
        let repo = Arc::new(InMemoryPaymentRepository::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let order_id = OrderId::new();
        let payment = completed_payment(&repo, order_id).await;

        let service = PaymentService::new(repo.clone(), bus.clone(), Arc::new(MockPaymentGateway::new(1.0)));
        let mut sub = bus.subscribe(Topic::Payments).await.unwrap();

        service
            .refund(RefundInput {
                order_id,
                amount: Money::from_dollars(40.0),
                reason: "inventory allocation failed".into(),
                saga_id: None,
            })
            .await
            .unwrap();

        let envelope = sub.recv().await.unwrap();
        match envelope.payload {
            EventPayload::PaymentRefunded(p) => assert_eq!(p.payment_id, payment.id),
            other => panic!("unexpected payload: {other:?}"),
        }

        let stored = repo.find_by_id(payment.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Refunded);
    }

    #[tokio::test]
    async fn no_op_when_no_payment_on_record() {
        let repo = Arc::new(InMemoryPaymentRepository::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let service = PaymentService::new(repo, bus, Arc::new(MockPaymentGateway::new(1.0)));

        service
            .refund(RefundInput {
                order_id: OrderId::new(),
                amount: Money::from_dollars(10.0),
                reason: "no such order".into(),
                saga_id: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn duplicate_refund_is_a_no_op() {
        let repo = Arc::new(InMemoryPaymentRepository::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let order_id = OrderId::new();
        completed_payment(&repo, order_id).await;
        let service = PaymentService::new(repo.clone(), bus.clone(), Arc::new(MockPaymentGateway::new(1.0)));

        service
            .refund(RefundInput {
                order_id,
                amount: Money::from_dollars(40.0),
                reason: "first".into(),
                saga_id: None,
            })
            .await
            .unwrap();

        // second delivery of the same refund request must not error or double-refund
        service
            .refund(RefundInput {
                order_id,
                amount: Money::from_dollars(40.0),
                reason: "redelivered".into(),
                saga_id: None,
            })
            .await
            .unwrap();
    }
}
