use event_envelope::{EventEnvelope, EventPayload};

use crate::error::ServiceError;

use super::commands::AllocateInventoryInput;
use super::InventoryService;

/// Routes a bus event to the command it triggers. Every other event type is
/// a no-op: this service only reacts to `inventory_requested`.
pub async fn dispatch(service: &InventoryService, envelope: EventEnvelope) -> Result<(), ServiceError> {
    match envelope.payload {
        EventPayload::InventoryRequested(payload) => {
            service
                .allocate_inventory(AllocateInventoryInput {
                    order_id: payload.order_id,
                    saga_id: envelope.saga_id,
                    items: payload.items,
                })
                .await?;
            Ok(())
        }
        _ => Ok(()),
    }
}
