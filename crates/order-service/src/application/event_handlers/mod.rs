mod inventory_allocated;
mod order_shipped;
mod payment_processed;

pub use inventory_allocated::handle_inventory_allocated;
pub use order_shipped::handle_order_shipped;
pub use payment_processed::handle_payment_processed;

use event_envelope::{EventEnvelope, EventPayload};

use crate::error::ServiceError;

use super::OrderService;

/// Routes one event off the bus to the handler for its payload type.
/// Payloads this service doesn't react to (its own `OrderCreated`,
/// `OrderCancelled`, `PaymentRequested`, `InventoryRequested`) are no-ops —
/// Order Service subscribes to `payments`, `inventory`, and `shipping`, so
/// in practice only the three variants below ever arrive here.
pub async fn dispatch(service: &OrderService, envelope: EventEnvelope) -> Result<(), ServiceError> {
    match envelope.payload {
        EventPayload::PaymentProcessed(payload) => handle_payment_processed(service, payload).await,
        EventPayload::InventoryAllocated(payload) => {
            handle_inventory_allocated(service, payload).await
        }
        EventPayload::OrderShipped(payload) => handle_order_shipped(service, payload).await,
        _ => Ok(()),
    }
}
