mod error;
mod payment;
mod status;

pub use error::PaymentError;
pub use payment::Payment;
pub use status::{PaymentMethod, PaymentStatus};
