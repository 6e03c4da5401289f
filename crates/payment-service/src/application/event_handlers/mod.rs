use event_envelope::{EventEnvelope, EventPayload};

use crate::error::ServiceError;

use super::commands::{ProcessPaymentInput, RefundInput};
use super::PaymentService;

/// Routes a bus event to the command it triggers. Events this service has
/// no interest in are ignored.
pub async fn dispatch(service: &PaymentService, envelope: EventEnvelope) -> Result<(), ServiceError> {
    match envelope.payload {
        EventPayload::PaymentRequested(payload) => {
            service
                .process_payment(ProcessPaymentInput {
                    order_id: payload.order_id,
                    customer_id: payload.customer_id,
                    amount: payload.amount,
                    saga_id: envelope.saga_id,
                })
                .await
        }
        EventPayload::PaymentRefundRequested(payload) => {
            service
                .refund(RefundInput {
                    order_id: payload.order_id,
                    amount: payload.amount,
                    reason: payload.reason,
                    saga_id: envelope.saga_id,
                })
                .await
        }
        _ => Ok(()),
    }
}
