use serde::{Deserialize, Serialize};

/// The lifecycle of an order, driven by commands and by events consumed
/// from the bus.
///
/// ```text
/// CREATED ─► PENDING_PAYMENT ─► PAYMENT_CONFIRMED ─► PENDING_INVENTORY ─► INVENTORY_CONFIRMED ─► SHIPPED ─► DELIVERED
///    │              │                                        │
///    └──────────────┴───────────── CancelOrder ───────────────┘
///                   │                                        │
///                   └──────────────── failure ────────────────┘──► FAILED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    PendingPayment,
    PaymentConfirmed,
    PendingInventory,
    InventoryConfirmed,
    Shipped,
    Delivered,
    Cancelled,
    Failed,
}

impl OrderStatus {
    /// `DELIVERED`, `CANCELLED`, and `FAILED` admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Failed
        )
    }

    /// `SHIPPED` and `DELIVERED` are the only states `CancelOrder` rejects;
    /// every other state, terminal or not, permits cancellation.
    pub fn can_cancel(&self) -> bool {
        !matches!(self, OrderStatus::Shipped | OrderStatus::Delivered)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::PendingPayment => "PENDING_PAYMENT",
            OrderStatus::PaymentConfirmed => "PAYMENT_CONFIRMED",
            OrderStatus::PendingInventory => "PENDING_INVENTORY",
            OrderStatus::InventoryConfirmed => "INVENTORY_CONFIRMED",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_shipped_and_delivered_reject_cancellation() {
        assert!(OrderStatus::Created.can_cancel());
        assert!(OrderStatus::PendingPayment.can_cancel());
        assert!(OrderStatus::PaymentConfirmed.can_cancel());
        assert!(OrderStatus::PendingInventory.can_cancel());
        assert!(OrderStatus::InventoryConfirmed.can_cancel());
        assert!(!OrderStatus::Shipped.can_cancel());
        assert!(!OrderStatus::Delivered.can_cancel());
    }

    #[test]
    fn terminal_states() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
        assert!(!OrderStatus::Created.is_terminal());
    }

    #[test]
    fn serializes_as_uppercase_token() {
        let json = serde_json::to_string(&OrderStatus::PendingPayment).unwrap();
        assert_eq!(json, "\"PENDING_PAYMENT\"");
    }
}
