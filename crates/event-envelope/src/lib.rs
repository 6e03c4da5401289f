//! The event envelope and payload schema shared by every service on the bus.
//!
//! Three services previously defined nearly identical event hierarchies;
//! this crate is the single shared artifact they all depend on instead.

mod envelope;
mod payload;
mod topic;

pub use envelope::{EventEnvelope, EventId};
pub use payload::{
    EventPayload, InventoryAllocatedPayload, InventoryReleasedPayload, InventoryRequestedPayload,
    ItemSnapshot, OrderCancelledPayload, OrderCreatedPayload, OrderShippedPayload,
    PaymentProcessedPayload, PaymentRefundRequestedPayload, PaymentRefundedPayload,
    PaymentRequestedPayload,
};
pub use topic::Topic;
