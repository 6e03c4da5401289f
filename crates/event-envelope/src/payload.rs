use std::collections::HashMap;

use common::{CustomerId, Money, OrderId, PaymentId, ProductId};
use serde::{Deserialize, Serialize};

use crate::Topic;

/// A line item as it appears inside an `order_created` event payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub quantity: u32,
    pub unit_price: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCreatedPayload {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub total_amount: Money,
    pub items: HashMap<ProductId, ItemSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCancelledPayload {
    pub order_id: OrderId,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequestedPayload {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentProcessedPayload {
    pub order_id: OrderId,
    pub payment_id: PaymentId,
    pub success: bool,
    pub message: String,
}

/// Recovered from `original_source`'s compensation gap: requests a refund
/// for a payment whose order later failed inventory allocation.
///
/// `payment_id` is `None` when the publisher (Order Service) has no record
/// of it — Order Service never persists the payment's own ID, only that
/// its payment was confirmed — in which case Payment Service resolves the
/// completed payment to refund by `order_id` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRefundRequestedPayload {
    pub order_id: OrderId,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payment_id: Option<PaymentId>,
    pub amount: Money,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRefundedPayload {
    pub order_id: OrderId,
    pub payment_id: PaymentId,
    pub amount: Money,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRequestedPayload {
    pub order_id: OrderId,
    pub items: HashMap<ProductId, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryAllocatedPayload {
    pub order_id: OrderId,
    pub success: bool,
    pub message: String,
    pub allocated_items: HashMap<ProductId, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryReleasedPayload {
    pub order_id: OrderId,
    pub items: HashMap<ProductId, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderShippedPayload {
    pub order_id: OrderId,
    pub tracking_number: String,
}

/// The tagged union of every event this system publishes.
///
/// Serializes as `{"event_type": "order_created", ...payload fields}` — one
/// internally-tagged enum rather than the base-record-plus-mutated-type
/// encoding the source language used, per the shared-envelope design note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum EventPayload {
    OrderCreated(OrderCreatedPayload),
    OrderCancelled(OrderCancelledPayload),
    PaymentRequested(PaymentRequestedPayload),
    PaymentProcessed(PaymentProcessedPayload),
    PaymentRefundRequested(PaymentRefundRequestedPayload),
    PaymentRefunded(PaymentRefundedPayload),
    InventoryRequested(InventoryRequestedPayload),
    InventoryAllocated(InventoryAllocatedPayload),
    InventoryReleased(InventoryReleasedPayload),
    OrderShipped(OrderShippedPayload),
}

impl EventPayload {
    /// The topic this event is published on.
    pub fn topic(&self) -> Topic {
        match self {
            EventPayload::OrderCreated(_) | EventPayload::OrderCancelled(_) => Topic::Orders,
            EventPayload::PaymentRequested(_)
            | EventPayload::PaymentProcessed(_)
            | EventPayload::PaymentRefundRequested(_)
            | EventPayload::PaymentRefunded(_) => Topic::Payments,
            EventPayload::InventoryRequested(_)
            | EventPayload::InventoryAllocated(_)
            | EventPayload::InventoryReleased(_) => Topic::Inventory,
            EventPayload::OrderShipped(_) => Topic::Shipping,
        }
    }

    /// The order this event pertains to, used to fall back to when no
    /// `saga_id` is present on the envelope (every partition key needs one).
    pub fn order_id(&self) -> OrderId {
        match self {
            EventPayload::OrderCreated(p) => p.order_id,
            EventPayload::OrderCancelled(p) => p.order_id,
            EventPayload::PaymentRequested(p) => p.order_id,
            EventPayload::PaymentProcessed(p) => p.order_id,
            EventPayload::PaymentRefundRequested(p) => p.order_id,
            EventPayload::PaymentRefunded(p) => p.order_id,
            EventPayload::InventoryRequested(p) => p.order_id,
            EventPayload::InventoryAllocated(p) => p.order_id,
            EventPayload::InventoryReleased(p) => p.order_id,
            EventPayload::OrderShipped(p) => p.order_id,
        }
    }

    /// The `event_type` wire tag, e.g. `"order_created"`.
    pub fn event_type(&self) -> &'static str {
        match self {
            EventPayload::OrderCreated(_) => "order_created",
            EventPayload::OrderCancelled(_) => "order_cancelled",
            EventPayload::PaymentRequested(_) => "payment_requested",
            EventPayload::PaymentProcessed(_) => "payment_processed",
            EventPayload::PaymentRefundRequested(_) => "payment_refund_requested",
            EventPayload::PaymentRefunded(_) => "payment_refunded",
            EventPayload::InventoryRequested(_) => "inventory_requested",
            EventPayload::InventoryAllocated(_) => "inventory_allocated",
            EventPayload::InventoryReleased(_) => "inventory_released",
            EventPayload::OrderShipped(_) => "order_shipped",
        }
    }
}
