mod error;
mod order;
mod status;

pub use error::OrderError;
pub use order::{Order, OrderItem};
pub use status::OrderStatus;
