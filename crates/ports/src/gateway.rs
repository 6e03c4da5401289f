use async_trait::async_trait;
use common::Money;

use crate::GatewayError;

/// Result of attempting to charge a payment method. A declined charge is a
/// successful gateway call with `success: false`, not a `GatewayError`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeOutcome {
    pub success: bool,
    pub transaction_id: Option<String>,
    pub failure_reason: Option<String>,
}

/// Result of attempting to refund a prior charge.
#[derive(Debug, Clone, PartialEq)]
pub struct RefundOutcome {
    pub success: bool,
    pub failure_reason: Option<String>,
}

/// The external payment processor, abstracted behind a capability trait per
/// spec. The only adapter in this workspace is a mock gateway; real
/// processor integration is out of scope.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(
        &self,
        amount: Money,
        payment_method: &str,
    ) -> Result<ChargeOutcome, GatewayError>;

    async fn refund(
        &self,
        transaction_id: &str,
        amount: Money,
    ) -> Result<RefundOutcome, GatewayError>;
}
