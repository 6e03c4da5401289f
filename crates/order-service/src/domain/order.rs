use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, ProductId, SagaId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::OrderError;
use super::status::OrderStatus;

/// A line item on an order, matching the wire shape
/// `{product_id, quantity, unit_price}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderItem {
    pub fn total_price(&self) -> Money {
        self.unit_price
            .checked_mul_quantity(self.quantity)
            .unwrap_or(Money::ZERO)
    }
}

/// The Order aggregate. Mutated only by Order Service command and event
/// handlers; never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub saga_id: Option<SagaId>,
    pub metadata: HashMap<String, Value>,
}

impl Order {
    /// Validates preconditions and builds a new order in `CREATED`.
    ///
    /// `CreateOrder` always mints a saga for the order it creates, so
    /// `saga_id` is required here even though the field stays `Option` to
    /// match the wire attribute, which is nullable in principle.
    pub fn create(
        customer_id: CustomerId,
        items: Vec<OrderItem>,
        saga_id: SagaId,
    ) -> Result<Self, OrderError> {
        if items.is_empty() {
            return Err(OrderError::NoItems);
        }
        for item in &items {
            if item.quantity < 1 {
                return Err(OrderError::InvalidQuantity(item.product_id.clone()));
            }
            if item.unit_price < Money::ZERO {
                return Err(OrderError::InvalidPrice(item.product_id.clone()));
            }
        }

        let now = Utc::now();
        Ok(Self {
            id: OrderId::new(),
            customer_id,
            items,
            status: OrderStatus::Created,
            created_at: now,
            modified_at: now,
            saga_id: Some(saga_id),
            metadata: HashMap::new(),
        })
    }

    pub fn total_amount(&self) -> Money {
        self.items.iter().map(OrderItem::total_price).sum()
    }

    /// `CREATED` → `PENDING_PAYMENT`, the second half of `CreateOrder`.
    pub fn start_awaiting_payment(&mut self) {
        self.status = OrderStatus::PendingPayment;
        self.modified_at = Utc::now();
    }

    /// Applies a `PaymentProcessed` event. Returns `false` without mutating
    /// anything if the order has already moved past `PENDING_PAYMENT` —
    /// the idempotent no-op a redelivered or racing event requires.
    pub fn apply_payment_processed(&mut self, success: bool, message: &str) -> bool {
        if self.status != OrderStatus::PendingPayment {
            return false;
        }
        if success {
            self.status = OrderStatus::PaymentConfirmed;
        } else {
            self.status = OrderStatus::Failed;
            self.metadata
                .insert("payment_failure_reason".into(), Value::String(message.into()));
        }
        self.modified_at = Utc::now();
        true
    }

    /// `PAYMENT_CONFIRMED` → `PENDING_INVENTORY`, mirroring
    /// `start_awaiting_payment` for the next leg of the saga.
    pub fn start_awaiting_inventory(&mut self) {
        self.status = OrderStatus::PendingInventory;
        self.modified_at = Utc::now();
    }

    /// Applies an `InventoryAllocated` event. Returns `false` if the order
    /// is not currently `PENDING_INVENTORY`.
    pub fn apply_inventory_allocated(
        &mut self,
        success: bool,
        message: &str,
        allocated_items: HashMap<ProductId, u32>,
    ) -> bool {
        if self.status != OrderStatus::PendingInventory {
            return false;
        }
        if success {
            self.status = OrderStatus::InventoryConfirmed;
            let snapshot = allocated_items
                .into_iter()
                .map(|(pid, qty)| (pid.to_string(), Value::from(qty)))
                .collect();
            self.metadata
                .insert("allocated_items".into(), Value::Object(snapshot));
        } else {
            self.status = OrderStatus::Failed;
            self.metadata
                .insert("inventory_failure_reason".into(), Value::String(message.into()));
        }
        self.modified_at = Utc::now();
        true
    }

    /// Applies an `OrderShipped` event. Returns `false` if the order is not
    /// currently `INVENTORY_CONFIRMED`.
    pub fn apply_shipped(&mut self, tracking_number: &str) -> bool {
        if self.status != OrderStatus::InventoryConfirmed {
            return false;
        }
        self.status = OrderStatus::Shipped;
        self.metadata.insert(
            "tracking_number".into(),
            Value::String(tracking_number.into()),
        );
        self.modified_at = Utc::now();
        true
    }

    /// Whether this order's payment had already been confirmed (and so a
    /// refund is owed) at the moment inventory allocation fails.
    pub fn payment_was_confirmed(&self) -> bool {
        matches!(
            self.status,
            OrderStatus::PaymentConfirmed | OrderStatus::PendingInventory
        )
    }

    /// Cancels the order. Returns `Ok(true)` if this call performed the
    /// transition, `Ok(false)` if the order was already `CANCELLED` (the
    /// idempotent no-op re-cancelling requires), or `Err` if the order has
    /// already shipped or been delivered.
    pub fn cancel(&mut self, reason: impl Into<String>) -> Result<bool, OrderError> {
        if !self.status.can_cancel() {
            return Err(OrderError::CannotCancelShippedOrDelivered);
        }
        if self.status == OrderStatus::Cancelled {
            return Ok(false);
        }
        self.status = OrderStatus::Cancelled;
        self.metadata
            .insert("cancellation_reason".into(), Value::String(reason.into()));
        self.modified_at = Utc::now();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(pid: &str, qty: u32, price: f64) -> OrderItem {
        OrderItem {
            product_id: ProductId::new(pid),
            quantity: qty,
            unit_price: Money::from_dollars(price),
        }
    }

    #[test]
    fn total_amount_matches_sum_of_line_totals() {
        let order = Order::create(
            CustomerId::new("c1"),
            vec![item("p1", 2, 10.0), item("p2", 1, 20.0)],
            SagaId::new(),
        )
        .unwrap();
        assert_eq!(order.total_amount(), Money::from_dollars(40.0));
    }

    #[test]
    fn rejects_empty_item_list() {
        let err = Order::create(CustomerId::new("c1"), vec![], SagaId::new()).unwrap_err();
        assert_eq!(err, OrderError::NoItems);
    }

    #[test]
    fn rejects_zero_quantity() {
        let err = Order::create(CustomerId::new("c1"), vec![item("p1", 0, 10.0)], SagaId::new())
            .unwrap_err();
        assert_eq!(err, OrderError::InvalidQuantity(ProductId::new("p1")));
    }

    #[test]
    fn payment_processed_noop_once_order_has_moved_on() {
        let mut order =
            Order::create(CustomerId::new("c1"), vec![item("p1", 1, 10.0)], SagaId::new())
                .unwrap();
        order.start_awaiting_payment();
        assert!(order.apply_payment_processed(true, "ok"));
        assert_eq!(order.status, OrderStatus::PaymentConfirmed);

        // A duplicate delivery after the order has moved on must no-op.
        assert!(!order.apply_payment_processed(true, "ok"));
        assert_eq!(order.status, OrderStatus::PaymentConfirmed);
    }

    #[test]
    fn cancel_rejects_shipped_orders() {
        let mut order =
            Order::create(CustomerId::new("c1"), vec![item("p1", 1, 10.0)], SagaId::new())
                .unwrap();
        order.status = OrderStatus::Shipped;
        let err = order.cancel("buyer-remorse").unwrap_err();
        assert_eq!(err, OrderError::CannotCancelShippedOrDelivered);
    }

    #[test]
    fn cancel_twice_is_idempotent() {
        let mut order =
            Order::create(CustomerId::new("c1"), vec![item("p1", 1, 10.0)], SagaId::new())
                .unwrap();
        assert!(order.cancel("buyer-remorse").unwrap());
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert!(!order.cancel("buyer-remorse").unwrap());
        assert_eq!(order.status, OrderStatus::Cancelled);
    }

    #[test]
    fn cancelled_order_ignores_a_racing_payment_processed() {
        let mut order =
            Order::create(CustomerId::new("c1"), vec![item("p1", 1, 10.0)], SagaId::new())
                .unwrap();
        order.start_awaiting_payment();
        order.cancel("buyer-remorse").unwrap();
        assert!(!order.apply_payment_processed(true, "ok"));
        assert_eq!(order.status, OrderStatus::Cancelled);
    }

    #[test]
    fn roundtrips_through_json() {
        let order =
            Order::create(CustomerId::new("c1"), vec![item("p1", 2, 10.0)], SagaId::new())
                .unwrap();
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, back);
        assert_eq!(order.total_amount(), back.total_amount());
    }
}
