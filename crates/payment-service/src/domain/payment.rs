use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, PaymentId, SagaId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::PaymentError;
use super::status::{PaymentMethod, PaymentStatus};

/// The Payment aggregate. `transaction_id` is non-null iff `status ==
/// COMPLETED`, or was `COMPLETED` before a later `REFUNDED` transition
/// (spec.md §3) — `complete` sets it, and nothing ever clears it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub amount: Money,
    pub currency: String,
    pub status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub saga_id: Option<SagaId>,
    pub metadata: HashMap<String, Value>,
}

impl Payment {
    /// Builds a new payment in `PENDING`. `amount` must not be negative.
    pub fn new(
        order_id: OrderId,
        customer_id: CustomerId,
        amount: Money,
        payment_method: PaymentMethod,
        saga_id: Option<SagaId>,
    ) -> Result<Self, PaymentError> {
        if amount < Money::ZERO {
            return Err(PaymentError::InvalidAmount);
        }
        let now = Utc::now();
        Ok(Self {
            id: PaymentId::new(),
            order_id,
            customer_id,
            amount,
            currency: "USD".to_string(),
            status: PaymentStatus::Pending,
            payment_method,
            transaction_id: None,
            created_at: now,
            modified_at: now,
            saga_id,
            metadata: HashMap::new(),
        })
    }

    /// `PENDING` → `PROCESSING`.
    pub fn start_processing(&mut self) {
        self.status = PaymentStatus::Processing;
        self.modified_at = Utc::now();
    }

    /// `PROCESSING` → `COMPLETED`.
    pub fn complete(&mut self, transaction_id: impl Into<String>) {
        self.status = PaymentStatus::Completed;
        self.transaction_id = Some(transaction_id.into());
        self.modified_at = Utc::now();
    }

    /// `PROCESSING` → `FAILED`, recording the decline/error reason.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = PaymentStatus::Failed;
        self.metadata
            .insert("failure_reason".into(), Value::String(message.into()));
        self.modified_at = Utc::now();
    }

    /// `COMPLETED` → `REFUNDED`. Rejected from any other state.
    pub fn refund(&mut self, reason: impl Into<String>) -> Result<(), PaymentError> {
        if self.status != PaymentStatus::Completed {
            return Err(PaymentError::RefundRequiresCompleted);
        }
        self.status = PaymentStatus::Refunded;
        self.metadata
            .insert("refund_reason".into(), Value::String(reason.into()));
        self.modified_at = Utc::now();
        Ok(())
    }

    /// Whether this payment has reached a terminal outcome for
    /// `ProcessPayment`'s idempotency check (`COMPLETED` or `FAILED`;
    /// `REFUNDED` also counts, since it started as `COMPLETED`).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            PaymentStatus::Completed | PaymentStatus::Failed | PaymentStatus::Refunded
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_payment() -> Payment {
        Payment::new(
            OrderId::new(),
            CustomerId::new("c1"),
            Money::from_dollars(40.0),
            PaymentMethod::CreditCard,
            None,
        )
        .unwrap()
    }

    #[test]
    fn rejects_negative_amount() {
        let err = Payment::new(
            OrderId::new(),
            CustomerId::new("c1"),
            Money::from_cents(-1),
            PaymentMethod::CreditCard,
            None,
        )
        .unwrap_err();
        assert_eq!(err, PaymentError::InvalidAmount);
    }

    #[test]
    fn complete_sets_transaction_id() {
        let mut payment = new_payment();
        payment.start_processing();
        payment.complete("txn_123");
        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(payment.transaction_id.as_deref(), Some("txn_123"));
    }

    #[test]
    fn fail_records_reason_without_transaction_id() {
        let mut payment = new_payment();
        payment.start_processing();
        payment.fail("Card declined");
        assert_eq!(payment.status, PaymentStatus::Failed);
        assert_eq!(payment.transaction_id, None);
        assert_eq!(payment.metadata.get("failure_reason").unwrap(), "Card declined");
    }

    #[test]
    fn refund_requires_completed() {
        let mut payment = new_payment();
        let err = payment.refund("buyer-remorse").unwrap_err();
        assert_eq!(err, PaymentError::RefundRequiresCompleted);

        payment.start_processing();
        payment.complete("txn_123");
        payment.refund("buyer-remorse").unwrap();
        assert_eq!(payment.status, PaymentStatus::Refunded);
        assert_eq!(payment.transaction_id.as_deref(), Some("txn_123"));
    }

    #[test]
    fn roundtrips_through_json() {
        let payment = new_payment();
        let json = serde_json::to_string(&payment).unwrap();
        let back: Payment = serde_json::from_str(&json).unwrap();
        assert_eq!(payment, back);
    }
}
