mod process_payment;
mod refund;

pub use process_payment::ProcessPaymentInput;
pub use refund::RefundInput;
