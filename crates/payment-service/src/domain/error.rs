use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    #[error("amount must not be negative")]
    InvalidAmount,

    #[error("refund is only permitted from COMPLETED")]
    RefundRequiresCompleted,
}
