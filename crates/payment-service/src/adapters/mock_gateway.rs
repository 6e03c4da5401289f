use std::time::Duration;

use async_trait::async_trait;
use common::Money;
use ports::{ChargeOutcome, GatewayError, PaymentGateway, RefundOutcome};
use rand::Rng;

const DECLINE_REASONS: &[&str] = &[
    "insufficient funds",
    "card declined by issuer",
    "expired card",
    "suspected fraud",
];

/// Stands in for the real processor. Declines ~10% of charges with a
/// randomly-chosen reason and simulates 50-200ms of network latency.
/// Refund success rate is configurable (`REFUND_SUCCESS_RATE`) since a real
/// processor can also decline a refund, e.g. a closed card. The real
/// integration is out of scope.
pub struct MockPaymentGateway {
    success_rate: f64,
    refund_success_rate: f64,
    min_latency: Duration,
    max_latency: Duration,
}

impl MockPaymentGateway {
    pub fn new(refund_success_rate: f64) -> Self {
        Self {
            success_rate: 0.9,
            refund_success_rate,
            min_latency: Duration::from_millis(50),
            max_latency: Duration::from_millis(200),
        }
    }

    async fn simulate_latency(&self) {
        let millis = rand::rng()
            .random_range(self.min_latency.as_millis() as u64..=self.max_latency.as_millis() as u64);
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self::new(0.95)
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    #[tracing::instrument(skip(self))]
    async fn charge(
        &self,
        amount: Money,
        payment_method: &str,
    ) -> Result<ChargeOutcome, GatewayError> {
        self.simulate_latency().await;

        if rand::rng().random_bool(self.success_rate) {
            let transaction_id = format!("txn_{}", uuid::Uuid::new_v4());
            tracing::debug!(%transaction_id, %amount, payment_method, "charge approved");
            Ok(ChargeOutcome {
                success: true,
                transaction_id: Some(transaction_id),
                failure_reason: None,
            })
        } else {
            let reason = DECLINE_REASONS[rand::rng().random_range(0..DECLINE_REASONS.len())];
            tracing::debug!(%amount, payment_method, reason, "charge declined");
            Ok(ChargeOutcome {
                success: false,
                transaction_id: None,
                failure_reason: Some(reason.to_string()),
            })
        }
    }

    #[tracing::instrument(skip(self))]
    async fn refund(
        &self,
        transaction_id: &str,
        amount: Money,
    ) -> Result<RefundOutcome, GatewayError> {
        self.simulate_latency().await;
        if rand::rng().random_bool(self.refund_success_rate) {
            tracing::debug!(transaction_id, %amount, "refund approved");
            Ok(RefundOutcome {
                success: true,
                failure_reason: None,
            })
        } else {
            tracing::debug!(transaction_id, %amount, "refund declined");
            Ok(RefundOutcome {
                success: false,
                failure_reason: Some("refund declined by issuer".to_string()),
            })
        }
    }
}
