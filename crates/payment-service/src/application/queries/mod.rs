mod get_payment;

pub use get_payment::GetPaymentInput;
